mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::{event_names, open_service, test_config};
use rpcore::roleplay::{
    Account, Actor, FoodDelta, HudEvent, InventoryResult, RoleplayError, Vec3, VehicleOptions,
};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn remove_money_never_overdraws() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, mut rx) = open_service(test_config(&dir));
    let id = svc.create_character("John Doe").expect("create").id;

    // Starting cash is 500; bring it down to 30.
    assert_eq!(assert_ok!(svc.remove_money(&id, 470, Account::Cash).await), 30);
    let _ = event_names(&mut rx);

    let err = assert_err!(svc.remove_money(&id, 50, Account::Cash).await);
    match err {
        RoleplayError::InsufficientFunds {
            balance, requested, ..
        } => {
            assert_eq!(balance, 30);
            assert_eq!(requested, 50);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(svc.get_money(&id, Account::Cash).expect("cash"), 30);
    assert!(event_names(&mut rx).is_empty(), "failed removal must not emit");
}

#[tokio::test]
async fn money_events_carry_all_balances() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, mut rx) = open_service(test_config(&dir));
    let id = svc.create_character("Jane Roe").expect("create").id;

    svc.add_money(&id, 250, Account::BlackMoney).await.expect("add");
    let names = event_names(&mut rx);
    assert_eq!(names, vec!["updateHUD", "hud:update"]);

    assert!(svc.has_character_enough(&id, 5_000, Account::Bank).expect("bank"));
    assert!(!svc.has_character_enough(&id, 5_001, Account::Bank).expect("bank"));
    assert!(matches!(
        svc.add_money(&id, -1, Account::Cash).await,
        Err(RoleplayError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn concurrent_deposits_are_not_lost() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _rx) = open_service(test_config(&dir));
    let id = svc.create_character("Busy Bee").expect("create").id;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let svc = svc.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            svc.add_money(&id, 10, Account::Bank).await.expect("deposit");
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }
    assert_eq!(svc.get_money(&id, Account::Bank).expect("bank"), 5_200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn host_state_survives_concurrent_deposits() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _rx) = open_service(test_config(&dir));
    let actor = Actor::new(40, "Mover");
    let id = svc.create_character("Moving Target").expect("create").id;
    svc.connect_character(&actor, &id).await.expect("connect");

    for round in 1..=60u32 {
        let deposit = {
            let svc = svc.clone();
            let id = id.clone();
            tokio::spawn(async move { svc.add_money(&id, 1, Account::Cash).await })
        };
        let moved = {
            let svc = svc.clone();
            let id = id.clone();
            let pos = Vec3::new(round as f32, 0.0, 0.0);
            tokio::spawn(async move { svc.update_actor_state(&id, round, 0, pos).await })
        };
        deposit.await.expect("join").expect("deposit");
        assert!(moved.await.expect("join"));

        let doc = svc.documents().get(&id).expect("bound");
        assert_eq!(doc.health, round.min(100), "round {}", round);
        assert_eq!(doc.position, Vec3::new(round as f32, 0.0, 0.0), "round {}", round);
    }
    assert_eq!(svc.get_money(&id, Account::Cash).expect("cash"), 560);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn deleted_vehicles_stay_deleted_during_save_pass() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _rx) = open_service(test_config(&dir));
    let owner = svc.create_character("Fleet Owner").expect("create").id;
    let ids: Vec<String> = (0..40)
        .map(|_| {
            svc.create_vehicle(
                &owner,
                "faggio",
                Vec3::default(),
                Vec3::default(),
                VehicleOptions::default(),
            )
            .expect("vehicle")
        })
        .collect();

    let stop = Arc::new(AtomicBool::new(false));
    let saver = {
        let svc = svc.clone();
        let stop = stop.clone();
        tokio::task::spawn_blocking(move || {
            while !stop.load(Ordering::Acquire) {
                svc.save_all_vehicles();
            }
        })
    };
    let deleter = {
        let svc = svc.clone();
        tokio::task::spawn_blocking(move || {
            for id in &ids {
                assert!(svc.delete_vehicle(id).expect("delete"));
            }
        })
    };
    deleter.await.expect("join");
    stop.store(true, Ordering::Release);
    saver.await.expect("join");

    assert!(svc.list_spawned_vehicles().is_empty());
    assert!(svc.store().list_vehicles().expect("list").is_empty());
    assert_eq!(svc.load_vehicles().expect("load"), 0);
}

#[tokio::test]
async fn assign_job_sets_status_label() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, mut rx) = open_service(test_config(&dir));
    let actor = Actor::console();
    let id = svc.create_character("Officer Dibble").expect("create").id;

    svc.assign_job(&actor, &id, "police", 2).await.expect("assign");
    let label = svc.get_job_data(&id).expect("label");
    assert_eq!(label.job_name, "police");
    assert_eq!(label.grade_name, "Officer");
    assert!(svc.does_character_have_job_grade(&id, "police", 2).expect("grade"));

    let status = common::drain(&mut rx)
        .into_iter()
        .find_map(|m| match m.event {
            HudEvent::Status {
                job_name, job_grade, ..
            } => Some((job_name, job_grade)),
            _ => None,
        })
        .expect("status event");
    assert_eq!(status, ("police".to_string(), "Officer".to_string()));

    // Single-job mode replaces the job outright.
    svc.assign_job(&actor, &id, "medic", 1).await.expect("reassign");
    let jobs = svc.get_character_data(&id).expect("data").jobs;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "medic");

    assert!(matches!(
        svc.assign_job(&actor, &id, "police", 9).await,
        Err(RoleplayError::InvalidArgument(_))
    ));
    assert!(matches!(
        svc.assign_job(&actor, &id, "pilot", 1).await,
        Err(RoleplayError::NotFound(_))
    ));

    assert!(svc.remove_job(&actor, &id, "medic").await.expect("remove"));
    assert!(!svc.remove_job(&actor, &id, "medic").await.expect("remove again"));
    let label = svc.get_job_data(&id).expect("label");
    assert_eq!(label.job_name, "Unemployed");
    assert_eq!(label.grade_name, "N/A");
}

#[tokio::test]
async fn double_jobs_respect_max_jobs() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = test_config(&dir);
    config.jobs.double_job_allowed = true;
    config.jobs.max_jobs = 1;
    let (svc, _rx) = open_service(config);
    let actor = Actor::console();
    let id = svc.create_character("Two Hats").expect("create").id;

    svc.assign_job(&actor, &id, "police", 1).await.expect("first");
    svc.assign_job(&actor, &id, "police", 3).await.expect("grade update");
    assert!(matches!(
        svc.assign_job(&actor, &id, "medic", 1).await,
        Err(RoleplayError::CapacityExceeded(_))
    ));
    let job = svc.get_character_job(&id).expect("job").expect("assigned");
    assert_eq!((job.name.as_str(), job.grade), ("police", 3));
}

#[tokio::test]
async fn food_fill_and_clamp() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, mut rx) = open_service(test_config(&dir));
    let id = svc.create_character("Hungry Hippo").expect("create").id;

    let values = svc
        .add_food_and_water(&id, FoodDelta::By(-80), FoodDelta::By(-500))
        .await
        .expect("decrease");
    assert_eq!(values, (20, 0));

    let values = svc
        .add_food_and_water(&id, FoodDelta::Fill, FoodDelta::By(30))
        .await
        .expect("fill");
    assert_eq!(values, (100, 30));
    assert_eq!(svc.get_character_food_and_water(&id).expect("read"), (100, 30));
    assert!(event_names(&mut rx).iter().all(|n| *n == "updateFoodHud"));

    let (food, water) = svc.remove_food_and_water(&id).await.expect("decay");
    assert!(food < 100 && food >= 0);
    assert!(water <= 30 && water >= 0);
}

#[tokio::test]
async fn inventory_stacks_and_respects_weight() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, mut rx) = open_service(test_config(&dir));
    let id = svc.create_character("Pack Mule").expect("create").id;

    let first = svc
        .add_inventory_item(&id, "item_health_kit", 2)
        .await
        .expect("add");
    assert_eq!(
        first,
        InventoryResult::Added {
            quantity: 2,
            stacked: false
        }
    );
    let second = svc
        .add_inventory_item(&id, "item_health_kit", 3)
        .await
        .expect("stack");
    assert_eq!(
        second,
        InventoryResult::Added {
            quantity: 3,
            stacked: true
        }
    );
    assert_eq!(svc.get_inventory_items(&id).expect("items").len(), 1);
    assert!(event_names(&mut rx).iter().all(|n| *n == "updateInventory"));

    // 5 kits weigh 25 of the default 40.
    assert!(matches!(
        svc.add_inventory_item(&id, "item_health_kit", 4).await,
        Err(RoleplayError::CapacityExceeded(_))
    ));
    assert!(matches!(
        svc.add_inventory_item(&id, "unobtainium", 1).await,
        Err(RoleplayError::NotFound(_))
    ));
    assert!(matches!(
        svc.add_inventory_item(&id, "item_apple", 0).await,
        Err(RoleplayError::InvalidArgument(_))
    ));

    assert!(!svc
        .remove_inventory_item(&id, "item_health_kit", 6)
        .await
        .expect("remove too many"));
    assert!(svc.has_item(&id, "item_health_kit", 5).expect("has"));
    assert!(svc
        .remove_inventory_item(&id, "item_health_kit", 5)
        .await
        .expect("remove all"));
    assert!(svc.get_inventory_items(&id).expect("items").is_empty());

    svc.set_max_weight(&id, 100).await.expect("weight");
    svc.add_inventory_item(&id, "item_health_kit", 10)
        .await
        .expect("fits now");
    svc.create_inventory(&id).await.expect("reset");
    assert!(svc.get_inventory_items(&id).expect("items").is_empty());
}

#[tokio::test]
async fn give_item_is_all_or_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _rx) = open_service(test_config(&dir));
    let giver = svc.create_character("Santa Claus").expect("create").id;
    let taker = svc.create_character("Tiny Tim").expect("create").id;

    svc.add_inventory_item(&giver, "item_health_kit", 6)
        .await
        .expect("seed");
    svc.set_max_weight(&taker, 10).await.expect("cap");

    // Three kits weigh 15, over the receiver's cap of 10.
    assert!(matches!(
        svc.give_item(&giver, &taker, "item_health_kit", 3).await,
        Err(RoleplayError::CapacityExceeded(_))
    ));
    assert!(svc.has_item(&giver, "item_health_kit", 6).expect("giver"));
    assert!(!svc.has_item(&taker, "item_health_kit", 1).expect("taker"));

    svc.give_item(&giver, &taker, "item_health_kit", 2)
        .await
        .expect("give");
    assert!(svc.has_item(&giver, "item_health_kit", 4).expect("giver"));
    assert!(!svc.has_item(&giver, "item_health_kit", 5).expect("giver"));
    assert!(svc.has_item(&taker, "item_health_kit", 2).expect("taker"));

    svc.drop_item(&taker, "item_health_kit", 2).await.expect("drop");
    assert!(svc.get_inventory_items(&taker).expect("items").is_empty());
    assert!(matches!(
        svc.drop_item(&taker, "item_health_kit", 1).await,
        Err(RoleplayError::ItemNotInInventory(_))
    ));
}

#[tokio::test]
async fn unknown_character_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _rx) = open_service(test_config(&dir));
    assert!(!svc.does_character_exist("nobody").expect("exists"));
    assert!(matches!(
        svc.add_money("nobody", 5, Account::Cash).await,
        Err(RoleplayError::NotFound(_))
    ));
    assert!(matches!(
        svc.get_character_data("nobody"),
        Err(RoleplayError::NotFound(_))
    ));
}
