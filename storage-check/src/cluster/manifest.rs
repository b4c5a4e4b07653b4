//! Kubernetes manifests for probe objects.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Capabilities, Container, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PersistentVolumeClaimVolumeSource, Pod, PodSecurityContext, PodSpec, SeccompProfile,
    SecurityContext, Volume, VolumeMount, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::{ClaimRequest, PodRequest};

const CONTAINER_NAME: &str = "checker";
const VOLUME_NAME: &str = "testvol";
const MOUNT_PATH: &str = "/mnt";

/// Build the PersistentVolumeClaim for a claim request.
pub fn claim_manifest(request: &ClaimRequest) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: ObjectMeta {
            generate_name: Some(request.generate_name.clone()),
            labels: Some(request.labels.clone()),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    Quantity(request.storage.clone()),
                )])),
                ..Default::default()
            }),
            storage_class_name: Some(request.storage_class.clone()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Build the Pod for a pod request.
///
/// The container runs unprivileged: fixed non-root identity, read-only root
/// filesystem, every capability dropped and no privilege escalation.
pub fn pod_manifest(request: &PodRequest) -> Pod {
    let uid = request.run_as;

    let container = Container {
        name: CONTAINER_NAME.to_string(),
        image: Some(request.image.clone()),
        command: Some(request.command.clone()),
        security_context: Some(SecurityContext {
            allow_privilege_escalation: Some(false),
            capabilities: Some(Capabilities {
                drop: Some(vec!["ALL".to_string()]),
                ..Default::default()
            }),
            privileged: Some(false),
            read_only_root_filesystem: Some(true),
            run_as_group: Some(uid),
            run_as_user: Some(uid),
            run_as_non_root: Some(true),
            ..Default::default()
        }),
        volume_mounts: Some(vec![VolumeMount {
            mount_path: MOUNT_PATH.to_string(),
            name: VOLUME_NAME.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    };

    Pod {
        metadata: ObjectMeta {
            generate_name: Some(request.generate_name.clone()),
            labels: Some(request.labels.clone()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            restart_policy: Some("Never".to_string()),
            containers: vec![container],
            security_context: Some(PodSecurityContext {
                fs_group: Some(uid),
                run_as_group: Some(uid),
                run_as_user: Some(uid),
                run_as_non_root: Some(true),
                supplemental_groups: Some(vec![uid]),
                seccomp_profile: Some(SeccompProfile {
                    type_: "RuntimeDefault".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            volumes: Some(vec![Volume {
                name: VOLUME_NAME.to_string(),
                persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                    claim_name: request.claim_name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
