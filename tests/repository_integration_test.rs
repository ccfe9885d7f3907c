// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 验证待匹配乘车/可用椅子查询与条件写入在 SQLite 上的语义
// ==========================================


use ride_dispatch::domain::{Coordinate, RideStatus};
use ride_dispatch::logging;
use ride_dispatch::repository::{DispatchRepository, RepositoryError};
use test_helpers::{ts, Fixture};

fn eligible_ids(fx: &Fixture) -> Vec<String> {
    fx.dispatch
        .eligible_chairs()
        .expect("读取可用椅子失败")
        .into_iter()
        .map(|c| c.chair_id)
        .collect()
}

// ==========================================
// UnmatchedRides
// ==========================================

#[test]
fn test_unmatched_rides_oldest_first() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let fx = Fixture::open(&db_path);

    fx.add_ride("r-late", (0, 0), 30);
    fx.add_ride("r-early", (0, 0), 10);
    fx.add_ride("r-mid", (0, 0), 20);

    let rides = fx.dispatch.unmatched_rides().unwrap();
    let ids: Vec<&str> = rides.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r-early", "r-mid", "r-late"]);
    assert!(rides.iter().all(|r| r.chair_id.is_none()));
}

#[test]
fn test_unmatched_rides_excludes_assigned() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((0, 0)));
    fx.add_ride("r1", (0, 0), 10);
    fx.add_ride("r2", (0, 0), 20);

    assert!(fx.dispatch.try_assign_chair("r1", "c1").unwrap());

    let rides = fx.dispatch.unmatched_rides().unwrap();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].id, "r2");
}

#[test]
fn test_created_ride_has_matching_status() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_ride("r1", (5, 7), 10);

    let ride = fx.rides.find_by_id("r1").unwrap().expect("乘车应存在");
    assert_eq!(ride.pickup, Coordinate::new(5, 7));
    assert_eq!(ride.created_at, ts(10));

    let statuses = fx.rides.list_statuses("r1").unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].status, RideStatus::Matching);
    assert!(!fx.rides.is_completed("r1").unwrap());
}

// ==========================================
// EligibleChairs
// ==========================================

#[test]
fn test_eligible_chairs_use_latest_location() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((0, 0)));
    fx.move_chair("c1", (50, 60), 100);
    fx.move_chair("c1", (7, 8), 50);

    let chairs = fx.dispatch.eligible_chairs().unwrap();
    assert_eq!(chairs.len(), 1);
    assert_eq!(chairs[0].position, Coordinate::new(50, 60));

    let latest = fx.locations.find_latest("c1").unwrap().unwrap();
    assert_eq!(latest.position, Coordinate::new(50, 60));
}

#[test]
fn test_chair_without_location_is_not_eligible() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c-located", 0, Some((1, 1)));
    fx.add_chair("c-unknown", 1, None);

    assert_eq!(eligible_ids(&fx), vec!["c-located"]);
}

#[test]
fn test_inactive_chair_is_not_eligible() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((1, 1)));
    fx.add_chair("c2", 1, Some((2, 2)));
    fx.chairs.set_active("c1", false, ts(5)).unwrap();

    assert_eq!(eligible_ids(&fx), vec!["c2"]);

    fx.chairs.set_active("c1", true, ts(6)).unwrap();
    assert_eq!(eligible_ids(&fx), vec!["c1", "c2"]);
}

#[test]
fn test_set_active_unknown_chair_is_not_found() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    let err = fx.chairs.set_active("ghost", false, ts(0)).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[test]
fn test_eligible_chairs_ordered_by_registration() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c-b", 20, Some((0, 0)));
    fx.add_chair("c-a", 10, Some((0, 0)));
    fx.add_chair("c-c", 30, Some((0, 0)));

    assert_eq!(eligible_ids(&fx), vec!["c-a", "c-b", "c-c"]);
}

#[test]
fn test_busy_chair_becomes_eligible_after_completion() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((0, 0)));
    fx.add_ride("r1", (0, 0), 10);

    assert!(fx.dispatch.try_assign_chair("r1", "c1").unwrap());
    assert!(eligible_ids(&fx).is_empty(), "未完成乘车的椅子不可用");

    // 中间状态仍然占用
    fx.rides.append_status("r1", RideStatus::Enroute, ts(20)).unwrap();
    assert!(eligible_ids(&fx).is_empty());

    fx.complete_ride("r1", 30);
    assert!(fx.rides.is_completed("r1").unwrap());
    assert_eq!(eligible_ids(&fx), vec!["c1"]);
}

// ==========================================
// TryAssignChair（条件写入）
// ==========================================

#[test]
fn test_try_assign_sets_chair() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((0, 0)));
    fx.add_ride("r1", (0, 0), 10);

    assert!(fx.dispatch.try_assign_chair("r1", "c1").unwrap());
    assert_eq!(fx.chair_of("r1").as_deref(), Some("c1"));

    let by_chair = fx.rides.find_by_chair("c1").unwrap();
    assert_eq!(by_chair.len(), 1);
    assert_eq!(by_chair[0].id, "r1");
}

#[test]
fn test_try_assign_rejects_already_assigned_ride() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((0, 0)));
    fx.add_chair("c2", 1, Some((0, 0)));
    fx.add_ride("r1", (0, 0), 10);

    assert!(fx.dispatch.try_assign_chair("r1", "c1").unwrap());
    assert!(!fx.dispatch.try_assign_chair("r1", "c2").unwrap());

    // 首次写入保持不变
    assert_eq!(fx.chair_of("r1").as_deref(), Some("c1"));
}

#[test]
fn test_try_assign_rejects_busy_chair() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((0, 0)));
    fx.add_ride("r1", (0, 0), 10);
    fx.add_ride("r2", (0, 0), 20);

    assert!(fx.dispatch.try_assign_chair("r1", "c1").unwrap());
    assert!(!fx.dispatch.try_assign_chair("r2", "c1").unwrap());
    assert_eq!(fx.chair_of("r2"), None);

    fx.complete_ride("r1", 30);
    assert!(fx.dispatch.try_assign_chair("r2", "c1").unwrap());
}

#[test]
fn test_try_assign_rejects_inactive_chair() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((0, 0)));
    fx.add_ride("r1", (0, 0), 10);
    fx.chairs.set_active("c1", false, ts(5)).unwrap();

    assert!(!fx.dispatch.try_assign_chair("r1", "c1").unwrap());
    assert_eq!(fx.chair_of("r1"), None);
}

#[test]
fn test_try_assign_unknown_ride_returns_false() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let fx = Fixture::open(&db_path);

    fx.add_chair("c1", 0, Some((0, 0)));

    assert!(!fx.dispatch.try_assign_chair("ghost", "c1").unwrap());
}
