use pmos_core::{ArtifactContent, ArtifactType, Epic};
use uuid::Uuid;

use super::{create_test_artifact, create_test_storage, create_test_user};
use crate::traits::ArtifactStore;

#[tokio::test]
async fn test_save_and_get_artifact() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let artifact = create_test_artifact(user.id, "Onboarding", None);
    storage.save_artifact(&artifact).await.unwrap();

    let loaded = storage.get_artifact(artifact.id).await.unwrap().unwrap();
    assert_eq!(loaded, artifact);
    assert!(storage.get_artifact(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_filters_by_type_and_owner() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let other = create_test_user(&storage).await;
    storage.save_artifact(&create_test_artifact(user.id, "One", None)).await.unwrap();
    storage.save_artifact(&create_test_artifact(user.id, "Two", None)).await.unwrap();
    storage.save_artifact(&create_test_artifact(other.id, "Theirs", None)).await.unwrap();

    let epics = storage.list_artifacts(user.id, Some(ArtifactType::Epic), 50).await.unwrap();
    assert_eq!(epics.len(), 2);
    let prds = storage.list_artifacts(user.id, Some(ArtifactType::Prd), 50).await.unwrap();
    assert!(prds.is_empty());
    let limited = storage.list_artifacts(user.id, None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_update_and_dependents() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let mut source = create_test_artifact(user.id, "Source PRD", None);
    storage.save_artifact(&source).await.unwrap();
    let dependent = create_test_artifact(user.id, "Derived", Some(source.id));
    storage.save_artifact(&dependent).await.unwrap();

    source
        .replace_content(ArtifactContent::Epic(Epic {
            title: "Source PRD v2".to_owned(),
            description: "Changed".to_owned(),
            acceptance_criteria: vec![],
        }))
        .unwrap();
    assert!(storage.update_artifact(&source).await.unwrap());

    let deps = storage.list_dependent_artifacts(source.id).await.unwrap();
    assert_eq!(deps.iter().map(|a| a.id).collect::<Vec<_>>(), vec![dependent.id]);

    assert!(storage.delete_artifact(source.id).await.unwrap());
    assert!(!storage.update_artifact(&source).await.unwrap());
}
