// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证调度配置读取、默认值回退与覆写
// ==========================================


use ride_dispatch::config::{config_keys, defaults, ConfigManager, DispatchConfigReader};
use ride_dispatch::engine::MatchingConfig;
use std::time::Duration;
use test_helpers::create_test_db;

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_defaults_when_no_config() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(
        config_manager.get_max_match_distance().await.unwrap(),
        defaults::MAX_MATCH_DISTANCE
    );
    assert_eq!(
        config_manager.get_matching_interval_ms().await.unwrap(),
        defaults::MATCHING_INTERVAL_MS
    );
    assert_eq!(
        config_manager.get_distance_cache_ttl_secs().await.unwrap(),
        defaults::DISTANCE_CACHE_TTL_SECS
    );

    let config = MatchingConfig::load(&config_manager).await.unwrap();
    assert_eq!(config, MatchingConfig::default());
    assert_eq!(config.max_match_distance, 400);
}

#[tokio::test]
async fn test_override_values() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_global_config_value(config_keys::MAX_MATCH_DISTANCE, "120")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::MATCHING_INTERVAL_MS, "250")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::DISTANCE_CACHE_TTL_SECS, "5")
        .unwrap();

    let config = MatchingConfig::load(&config_manager).await.unwrap();
    assert_eq!(config.max_match_distance, 120);
    assert_eq!(config.interval, Duration::from_millis(250));
    assert_eq!(config.distance_cache_ttl, Duration::from_secs(5));
}

#[tokio::test]
async fn test_set_value_overwrites_previous() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_global_config_value(config_keys::MAX_MATCH_DISTANCE, "100")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::MAX_MATCH_DISTANCE, "200")
        .unwrap();

    assert_eq!(
        config_manager
            .get_global_config_value(config_keys::MAX_MATCH_DISTANCE)
            .unwrap()
            .as_deref(),
        Some("200")
    );
    assert_eq!(config_manager.get_max_match_distance().await.unwrap(), 200);
}

#[tokio::test]
async fn test_unparseable_values_fall_back_to_default() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_global_config_value(config_keys::MAX_MATCH_DISTANCE, "far")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::DISTANCE_CACHE_TTL_SECS, "-3")
        .unwrap();

    assert_eq!(
        config_manager.get_max_match_distance().await.unwrap(),
        defaults::MAX_MATCH_DISTANCE
    );
    assert_eq!(
        config_manager.get_distance_cache_ttl_secs().await.unwrap(),
        defaults::DISTANCE_CACHE_TTL_SECS
    );
}

#[tokio::test]
async fn test_zero_interval_is_clamped() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_global_config_value(config_keys::MATCHING_INTERVAL_MS, "0")
        .unwrap();

    assert_eq!(config_manager.get_matching_interval_ms().await.unwrap(), 1);
}

#[tokio::test]
async fn test_config_snapshot_is_sorted_json() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(config_manager.get_config_snapshot().unwrap(), "{}");

    config_manager
        .set_global_config_value(config_keys::MATCHING_INTERVAL_MS, "250")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::MAX_MATCH_DISTANCE, "120")
        .unwrap();

    let snapshot = config_manager.get_config_snapshot().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(parsed["max_match_distance"], "120");
    assert_eq!(parsed["matching_interval_ms"], "250");

    // BTreeMap 序列化按 key 排序
    let max_pos = snapshot.find("max_match_distance").unwrap();
    let interval_pos = snapshot.find("matching_interval_ms").unwrap();
    assert!(interval_pos < max_pos);
}
