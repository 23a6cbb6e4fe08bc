// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Idempotent create-or-update of AgentConfig objects.

use std::collections::BTreeMap;

use kube::api::{ObjectMeta, PostParams};
use kube::runtime::events::{Event, EventType, Recorder};
use kube::{Api, Client, Resource, ResourceExt};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::agent_config::AgentConfig;

const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Ensure the cluster resource matches the desired AgentConfig.
///
/// Creates the object when it is absent, replaces its spec when it drifted,
/// and does nothing when metadata and spec already match. The returned flag
/// tells whether a write was performed. An unchanged apply issues no write
/// and no event.
pub async fn apply_agent_config(
    client: &Client,
    recorder: &Recorder,
    required: &AgentConfig,
) -> Result<(AgentConfig, bool)> {
    let namespace = required.namespace().unwrap_or_default();
    let name = required.name_any();
    let api: Api<AgentConfig> = Api::namespaced(client.clone(), &namespace);

    let existing = match api.get(&name).await {
        Ok(existing) => existing,
        Err(kube::Error::Api(err)) if err.code == 404 => {
            let mut desired = required.clone();
            strip_bookkeeping_metadata(&mut desired.metadata);
            let result = api.create(&PostParams::default(), &desired).await;
            report_create_event(recorder, &desired, result.as_ref().err()).await;
            return Ok((result?, true));
        }
        Err(e) => return Err(e.into()),
    };

    let mut updated = existing.clone();
    let meta_changed = merge_object_meta(&mut updated.metadata, &required.metadata);
    let spec_same = existing.spec == required.spec;
    if !meta_changed && spec_same {
        debug!(
            "AgentConfig {}/{} already up to date, skipping update",
            namespace, name
        );
        return Ok((existing, false));
    }
    if !spec_same {
        updated.spec = required.spec.clone();
    }

    let result = api.replace(&name, &PostParams::default(), &updated).await;
    report_update_event(recorder, required, result.as_ref().err()).await;
    Ok((result?, true))
}

/// Drop annotations the API server or kubectl own before creating an object
fn strip_bookkeeping_metadata(meta: &mut ObjectMeta) {
    if let Some(annotations) = meta.annotations.as_mut() {
        annotations.remove(LAST_APPLIED_ANNOTATION);
        if annotations.is_empty() {
            meta.annotations = None;
        }
    }
}

/// Merge required labels and annotations into the existing metadata without
/// removing keys other writers own. Returns true if anything changed.
fn merge_object_meta(existing: &mut ObjectMeta, required: &ObjectMeta) -> bool {
    let labels_changed = merge_string_map(&mut existing.labels, &required.labels);
    let annotations_changed = merge_string_map(&mut existing.annotations, &required.annotations);
    labels_changed || annotations_changed
}

fn merge_string_map(
    existing: &mut Option<BTreeMap<String, String>>,
    required: &Option<BTreeMap<String, String>>,
) -> bool {
    let Some(required) = required.as_ref() else {
        return false;
    };

    let target = existing.get_or_insert_with(BTreeMap::new);
    let mut changed = false;
    for (key, value) in required {
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

async fn report_create_event(recorder: &Recorder, obj: &AgentConfig, err: Option<&kube::Error>) {
    let event = match err {
        None => Event {
            type_: EventType::Normal,
            reason: "Created".to_string(),
            note: Some(format!(
                "Created AgentConfig {}/{} because it was missing",
                obj.namespace().unwrap_or_default(),
                obj.name_any()
            )),
            action: "Apply".to_string(),
            secondary: None,
        },
        Some(e) => Event {
            type_: EventType::Warning,
            reason: "CreateFailed".to_string(),
            note: Some(format!(
                "Failed to create AgentConfig {}/{}: {}",
                obj.namespace().unwrap_or_default(),
                obj.name_any(),
                e
            )),
            action: "Apply".to_string(),
            secondary: None,
        },
    };
    publish_event(recorder, obj, event).await;
}

async fn report_update_event(recorder: &Recorder, obj: &AgentConfig, err: Option<&kube::Error>) {
    let event = match err {
        None => Event {
            type_: EventType::Normal,
            reason: "Updated".to_string(),
            note: Some(format!(
                "Updated AgentConfig {}/{} because it changed",
                obj.namespace().unwrap_or_default(),
                obj.name_any()
            )),
            action: "Apply".to_string(),
            secondary: None,
        },
        Some(e) => Event {
            type_: EventType::Warning,
            reason: "UpdateFailed".to_string(),
            note: Some(format!(
                "Failed to update AgentConfig {}/{}: {}",
                obj.namespace().unwrap_or_default(),
                obj.name_any(),
                e
            )),
            action: "Apply".to_string(),
            secondary: None,
        },
    };
    publish_event(recorder, obj, event).await;
}

// Events are best-effort, a failed publish must never fail the apply.
async fn publish_event(recorder: &Recorder, obj: &AgentConfig, event: Event) {
    let reference = obj.object_ref(&());
    if let Err(e) = recorder.publish(&event, &reference).await {
        warn!("Failed to publish event: {}", e);
    }
}
