//! Conformance checks shared by every [`KvStore`] backend.
//!
//! Backends call [`run_conformance`] from their own test module. The checks
//! use keys under the `conformance/` prefix and clean up after themselves.

use std::time::Duration;

use crate::error::KvError;
use crate::store::KvStore;

macro_rules! ensure {
    ($cond:expr, $($msg:tt)+) => {
        if !$cond {
            return Err(format!($($msg)+));
        }
    };
}

/// Run every conformance check against `store`.
///
/// Returns a description of the first check that failed.
pub async fn run_conformance(store: &dyn KvStore) -> Result<(), String> {
    missing_key_is_none(store).await?;
    set_then_get(store).await?;
    set_overwrites(store).await?;
    binary_values(store).await?;
    delete_semantics(store).await?;
    long_ttl_is_readable(store).await?;
    empty_key_is_rejected(store).await?;
    Ok(())
}

fn backend(err: &KvError) -> String {
    format!("unexpected backend error: {err}")
}

async fn missing_key_is_none(store: &dyn KvStore) -> Result<(), String> {
    let value = store.get("conformance/missing").await.map_err(|e| backend(&e))?;
    ensure!(value.is_none(), "missing key returned {value:?}");
    Ok(())
}

async fn set_then_get(store: &dyn KvStore) -> Result<(), String> {
    let key = "conformance/set-get";
    store.set(key, b"hello", None).await.map_err(|e| backend(&e))?;
    let value = store.get(key).await.map_err(|e| backend(&e))?;
    ensure!(
        value.as_deref() == Some(b"hello".as_slice()),
        "expected stored value, got {value:?}"
    );
    store.delete(key).await.map_err(|e| backend(&e))?;
    Ok(())
}

async fn set_overwrites(store: &dyn KvStore) -> Result<(), String> {
    let key = "conformance/overwrite";
    store.set(key, b"first", None).await.map_err(|e| backend(&e))?;
    store.set(key, b"second", None).await.map_err(|e| backend(&e))?;
    let value = store.get(key).await.map_err(|e| backend(&e))?;
    ensure!(
        value.as_deref() == Some(b"second".as_slice()),
        "overwrite kept {value:?}"
    );
    store.delete(key).await.map_err(|e| backend(&e))?;
    Ok(())
}

async fn binary_values(store: &dyn KvStore) -> Result<(), String> {
    let key = "conformance/binary";
    let blob = [0u8, 159, 146, 150, 255];
    store.set(key, &blob, None).await.map_err(|e| backend(&e))?;
    let value = store.get(key).await.map_err(|e| backend(&e))?;
    ensure!(
        value.as_deref() == Some(blob.as_slice()),
        "binary value altered: {value:?}"
    );
    store.delete(key).await.map_err(|e| backend(&e))?;
    Ok(())
}

async fn delete_semantics(store: &dyn KvStore) -> Result<(), String> {
    let key = "conformance/delete";
    let existed = store.delete(key).await.map_err(|e| backend(&e))?;
    ensure!(!existed, "delete of a missing key reported true");

    store.set(key, b"x", None).await.map_err(|e| backend(&e))?;
    let existed = store.delete(key).await.map_err(|e| backend(&e))?;
    ensure!(existed, "delete of a live key reported false");

    let value = store.get(key).await.map_err(|e| backend(&e))?;
    ensure!(value.is_none(), "deleted key still readable: {value:?}");
    Ok(())
}

async fn long_ttl_is_readable(store: &dyn KvStore) -> Result<(), String> {
    let key = "conformance/ttl";
    store
        .set(key, b"ttl", Some(Duration::from_secs(3600)))
        .await
        .map_err(|e| backend(&e))?;
    let value = store.get(key).await.map_err(|e| backend(&e))?;
    ensure!(value.is_some(), "value with a live TTL was not readable");
    store.delete(key).await.map_err(|e| backend(&e))?;
    Ok(())
}

async fn empty_key_is_rejected(store: &dyn KvStore) -> Result<(), String> {
    match store.set("", b"x", None).await {
        Err(KvError::InvalidKey(_)) => Ok(()),
        other => Err(format!("empty key: expected InvalidKey, got {other:?}")),
    }
}
