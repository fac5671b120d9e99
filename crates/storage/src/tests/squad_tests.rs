use pmos_core::{MAX_SQUAD_SIZE, Squad, SquadAgent, find_agent};

use super::{create_test_storage, create_test_user};
use crate::{SquadActivation, StorageError};
use crate::traits::SquadStore;

fn agent(slug: &str) -> SquadAgent {
    SquadAgent::from_agent(find_agent(slug).unwrap())
}

#[tokio::test]
async fn test_activate_leaves_exactly_one_active() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let a = Squad::new(user.id, "Alpha".to_owned(), None);
    let b = Squad::new(user.id, "Beta".to_owned(), None);
    storage.create_squad(&a).await.unwrap();
    storage.create_squad(&b).await.unwrap();

    let first = SquadActivation::Activated { first_time: true };
    assert_eq!(storage.activate_squad(user.id, a.id).await.unwrap(), first);
    assert_eq!(storage.activate_squad(user.id, b.id).await.unwrap(), first);

    let squads = storage.list_squads(user.id).await.unwrap();
    let active: Vec<_> = squads.iter().filter(|s| s.is_active).map(|s| s.id).collect();
    assert_eq!(active, vec![b.id]);
}

#[tokio::test]
async fn test_first_activation_is_reported_once() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let a = Squad::new(user.id, "Alpha".to_owned(), None);
    let b = Squad::new(user.id, "Beta".to_owned(), None);
    storage.create_squad(&a).await.unwrap();
    storage.create_squad(&b).await.unwrap();

    storage.activate_squad(user.id, a.id).await.unwrap();
    let stamped = storage.get_squad(a.id).await.unwrap().unwrap().first_activated_at;
    assert!(stamped.is_some());
    storage.activate_squad(user.id, b.id).await.unwrap();

    let again = storage.activate_squad(user.id, a.id).await.unwrap();
    assert_eq!(again, SquadActivation::Activated { first_time: false });
    assert_eq!(storage.get_squad(a.id).await.unwrap().unwrap().first_activated_at, stamped);
}

#[tokio::test]
async fn test_activate_foreign_squad_is_refused() {
    let storage = create_test_storage();
    let owner = create_test_user(&storage).await;
    let other = create_test_user(&storage).await;
    let squad = Squad::new(owner.id, "Alpha".to_owned(), None);
    storage.create_squad(&squad).await.unwrap();

    assert_eq!(
        storage.activate_squad(other.id, squad.id).await.unwrap(),
        SquadActivation::NotFound
    );
    assert!(!storage.get_squad(squad.id).await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn test_add_agent_rejects_duplicates_and_overflow() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let squad = Squad::new(user.id, "Alpha".to_owned(), None);
    storage.create_squad(&squad).await.unwrap();

    storage.add_squad_agent(squad.id, &agent("nova"), MAX_SQUAD_SIZE).await.unwrap();
    let dup = storage.add_squad_agent(squad.id, &agent("nova"), MAX_SQUAD_SIZE).await;
    assert!(matches!(dup, Err(StorageError::Duplicate(_))));

    storage.add_squad_agent(squad.id, &agent("atlas"), 2).await.unwrap();
    let full = storage.add_squad_agent(squad.id, &agent("iris"), 2).await;
    assert!(matches!(full, Err(StorageError::Conflict(_))));

    assert_eq!(storage.largest_squad_size(user.id).await.unwrap(), 2);
    assert!(storage.remove_squad_agent(squad.id, "nova").await.unwrap());
    assert!(!storage.remove_squad_agent(squad.id, "nova").await.unwrap());
}

#[tokio::test]
async fn test_squad_keeps_its_agent_copy() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let squad = Squad::new(user.id, "Alpha".to_owned(), None);
    storage.create_squad(&squad).await.unwrap();

    let mut copy = agent("sage");
    copy.specialty = "Specialty at time of adding".to_owned();
    storage.add_squad_agent(squad.id, &copy, MAX_SQUAD_SIZE).await.unwrap();

    let loaded = storage.get_squad(squad.id).await.unwrap().unwrap();
    assert_eq!(loaded.agents[0].specialty, "Specialty at time of adding");
}
