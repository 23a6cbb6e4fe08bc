// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Finalizer list manipulation shared by the propagator and agent loops

use kube::api::ObjectMeta;

/// Check whether the metadata carries the given finalizer
pub fn has_finalizer(meta: &ObjectMeta, finalizer: &str) -> bool {
    meta.finalizers
        .as_ref()
        .is_some_and(|finalizers| finalizers.iter().any(|f| f == finalizer))
}

/// Append the finalizer unless it is already present. Returns true if the
/// list changed.
pub fn add_finalizer(meta: &mut ObjectMeta, finalizer: &str) -> bool {
    if has_finalizer(meta, finalizer) {
        return false;
    }
    meta.finalizers
        .get_or_insert_with(Vec::new)
        .push(finalizer.to_string());
    true
}

/// Remove the finalizer, leaving every other entry in place. Returns true if
/// the list changed.
pub fn remove_finalizer(meta: &mut ObjectMeta, finalizer: &str) -> bool {
    let Some(finalizers) = meta.finalizers.as_mut() else {
        return false;
    };
    let before = finalizers.len();
    finalizers.retain(|f| f != finalizer);
    finalizers.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINALIZER: &str =
        "hubofhubs.open-cluster-management.io/operator-propagator-resources-cleanup";
    const OTHER: &str = "kubernetes.io/some-other-finalizer";

    fn meta_with(finalizers: &[&str]) -> ObjectMeta {
        ObjectMeta {
            finalizers: Some(finalizers.iter().map(|f| f.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_finalizer_to_empty_metadata() {
        let mut meta = ObjectMeta::default();

        assert!(add_finalizer(&mut meta, FINALIZER));

        assert!(has_finalizer(&meta, FINALIZER));
        assert_eq!(meta.finalizers.unwrap().len(), 1);
    }

    #[test]
    fn test_add_finalizer_does_not_duplicate() {
        let mut meta = meta_with(&[FINALIZER]);

        assert!(!add_finalizer(&mut meta, FINALIZER));

        assert_eq!(meta.finalizers.unwrap().len(), 1);
    }

    #[test]
    fn test_add_finalizer_keeps_existing_entries() {
        let mut meta = meta_with(&[OTHER]);

        assert!(add_finalizer(&mut meta, FINALIZER));

        let finalizers = meta.finalizers.unwrap();
        assert_eq!(finalizers, vec![OTHER.to_string(), FINALIZER.to_string()]);
    }

    #[test]
    fn test_remove_finalizer_preserves_others() {
        let mut meta = meta_with(&[OTHER, FINALIZER]);

        assert!(remove_finalizer(&mut meta, FINALIZER));

        let finalizers = meta.finalizers.unwrap();
        assert_eq!(finalizers, vec![OTHER.to_string()]);
    }

    #[test]
    fn test_remove_finalizer_absent_is_noop() {
        let mut meta = meta_with(&[OTHER]);

        assert!(!remove_finalizer(&mut meta, FINALIZER));

        assert_eq!(meta.finalizers.unwrap().len(), 1);

        let mut empty = ObjectMeta::default();
        assert!(!remove_finalizer(&mut empty, FINALIZER));
    }
}
