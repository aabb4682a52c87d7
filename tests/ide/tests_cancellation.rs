//! Cancellation observed by long scans.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ets_analysis::ide::CancellationHost;

use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::*;

#[test]
fn test_cancelled_scans_return_nothing() {
    let flag = Arc::new(AtomicBool::new(true));
    let mut host = rename_host();
    host.set_cancellation_host(Some(flag as Arc<dyn CancellationHost>), Duration::ZERO);
    let analysis = host.analysis();
    let first = file_id(&analysis, &format!("{PROJECT_ROOT}/firstFile.ets"));

    assert!(analysis.find_references_at_position(first, ABC_DECLARATION, &[]).unwrap().is_empty());
    assert!(analysis.find_rename_locations(&[], first, ABC_DECLARATION).unwrap().is_empty());
}

#[test]
fn test_uncancelled_host_lets_scans_finish() {
    let flag = Arc::new(AtomicBool::new(false));
    let mut host = rename_host();
    host.set_cancellation_host(Some(flag.clone() as Arc<dyn CancellationHost>), Duration::ZERO);
    let analysis = host.analysis();
    let first = file_id(&analysis, &format!("{PROJECT_ROOT}/firstFile.ets"));

    assert_eq!(
        analysis.find_rename_locations(&[], first, ABC_DECLARATION).unwrap().len(),
        ABC_USES.len() + 1
    );
    flag.store(true, Ordering::Relaxed);
    assert!(analysis.cancellation_token().is_cancellation_requested());
}

#[test]
fn test_tokio_cancellation_token_as_host() {
    let source = tokio_util::sync::CancellationToken::new();
    let mut host = rename_host();
    host.set_cancellation_host(Some(Arc::new(source.clone())), Duration::ZERO);
    source.cancel();
    let analysis = host.analysis();
    let first = file_id(&analysis, &format!("{PROJECT_ROOT}/firstFile.ets"));
    assert!(analysis.find_references_at_position(first, ABC_DECLARATION, &[]).unwrap().is_empty());
}
