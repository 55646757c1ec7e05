use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use migra_core::migration::{
    LogLevel, MemoryLogger, MigrationAbortError, MigrationConfig, MigrationError,
    MigrationHandler, MigrationParamError, ParamOutcome, Payload, TransformError, from_fn,
};
use migra_core::request::{AssetRequest, Param};
use serde_json::Value;

const REQUEST_ID: &str = "PR-7001-1234-5678";

fn load_str(filename: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(filename);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

fn load_request(filename: &str) -> AssetRequest {
    serde_json::from_str(&load_str(filename)).expect("Should parse request fixture")
}

fn handler(config: MigrationConfig) -> (MigrationHandler, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    let handler = MigrationHandler::new(config).with_logger(logger.clone());
    (handler, logger)
}

fn tagged(message: &str) -> String {
    format!("[MIGRATION::{}] {}", REQUEST_ID, message)
}

fn field<'a>(data: &'a Payload, key: &str) -> Result<&'a str, TransformError> {
    data.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| MigrationParamError::missing_field(key).into())
}

fn uppercase_transformations() -> MigrationConfig {
    MigrationConfig::builder()
        .transformation(
            "email",
            from_fn(|data: &Payload, _: &str| Ok(field(data, "teamAdminEmail")?.to_uppercase())),
        )
        .transformation(
            "team_id",
            from_fn(|data: &Payload, _: &str| Ok(field(data, "teamId")?.to_uppercase())),
        )
        .transformation(
            "team_name",
            from_fn(|data: &Payload, _: &str| Ok(field(data, "teamName")?.to_uppercase())),
        )
        .transformation(
            "num_licensed_users",
            from_fn(|data: &Payload, _: &str| {
                let licenses: u32 = field(data, "licNumber")?
                    .parse()
                    .map_err(anyhow::Error::from)?;
                Ok((licenses * 10).to_string())
            }),
        )
        .build()
}

#[test]
fn test_properties() {
    let handler = MigrationHandler::default();
    assert!(handler.transformations().is_empty());
    assert_eq!(handler.migration_key(), "migration_info");
    assert!(!handler.serialize());
}

#[test]
fn test_needs_migration() {
    let no_migration: Vec<AssetRequest> =
        serde_json::from_str(&load_str("response.json")).expect("Should parse request list");
    assert_eq!(no_migration.len(), 1);
    assert!(!no_migration[0].needs_migration("migration_info"));

    let request = load_request("request.migrate.valid.json");
    assert!(request.needs_migration("migration_info"));
}

#[test]
fn test_no_migration() {
    let requests: Vec<AssetRequest> =
        serde_json::from_str(&load_str("response.json")).expect("Should parse request list");
    let (handler, logger) = handler(MigrationConfig::default());

    let result = handler.migrate(&requests[0]).unwrap();

    assert!(matches!(result, Cow::Borrowed(_)));
    assert_eq!(*result, requests[0]);
    assert_eq!(
        logger.messages(LogLevel::Info),
        ["[MIGRATION::PR-5852-1608-0000] AssetRequest does not need migration."]
    );
    assert_eq!(logger.records().len(), 1);
}

#[test]
fn test_migration_skip_all() {
    let request = load_request("request.migrate.valid.json");
    let (handler, logger) = handler(MigrationConfig::default());

    let migrated = handler.migrate_with_outcome(&request).unwrap().unwrap();

    assert_eq!(
        logger.messages(LogLevel::Info),
        [
            tagged("Running migration operations for request PR-7001-1234-5678"),
            tagged(
                "5 processed, 0 succeeded, 0 failed, 5 skipped \
                 (email, num_licensed_users, reseller_id, team_id, team_name)."
            ),
        ]
    );
    assert_eq!(
        logger.messages(LogLevel::Debug),
        [
            tagged(
                "Migration data `migration_info`: {\
                 \"teamAdminEmail\":\"example.migration@mailinator.com\",\
                 \"teamId\":\"dbtid:AADaQq_w53nMDQbIPM_X123456PuzpcM2BI\",\
                 \"resellerId\":[\"3ONEYO1234\"],\
                 \"teamName\":\"Migration Team\",\
                 \"licNumber\":\"10\"}"
            ),
            tagged("Migration data `migration_info` parsed correctly"),
        ]
    );
    assert!(migrated.outcome.succeeded().is_empty());
    assert!(migrated.outcome.failed().is_empty());
    assert_eq!(migrated.request, request);
    assert_eq!(migrated.request.asset.params.len(), 6);
}

#[test]
fn test_skip_only_migration_is_idempotent() {
    let request = load_request("request.migrate.valid.json");
    let (handler, _) = handler(MigrationConfig::default());

    let once = handler.migrate(&request).unwrap().into_owned();
    let twice = handler.migrate(&once).unwrap().into_owned();

    assert_eq!(once, request);
    assert_eq!(twice, request);
}

#[test]
fn test_migration_wrong_info() {
    let request = load_request("request.migrate.invalid.json");
    let (handler, logger) = handler(MigrationConfig::default());

    let err = handler.migrate(&request).unwrap_err();

    assert!(matches!(
        err.as_abort(),
        Some(MigrationAbortError::InvalidPayload(_))
    ));
    assert_eq!(
        logger.messages(LogLevel::Info),
        [tagged(
            "Running migration operations for request PR-7001-1234-5678"
        )]
    );
    assert_eq!(
        logger.messages(LogLevel::Debug),
        [tagged(
            "Migration data `migration_info`: \
             \"teamAdminEmail\":\"example.migration@mailinator.com\",\
             \"teamId\":\"dbtid:AADaQq_w53nMDQbIPM_X123456PuzpcM2BI\",\
             \"resellerId\":[\"3ONEYO1234\"],\
             \"teamName\":\"Migration Team\",\
             \"licNumber\":\"10\"}"
        )]
    );
    let errors = logger.messages(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with(&tagged("trailing characters")));
}

#[test]
fn test_migration_direct() {
    let request = load_request("request.migrate.direct.success.json");
    let (handler, logger) = handler(MigrationConfig::default());

    let migrated = handler.migrate(&request).unwrap();

    assert_ne!(*migrated, request);
    assert_eq!(migrated.id, REQUEST_ID);
    assert_eq!(migrated.asset.id, "AS-146-621-424-3");
    assert_eq!(migrated.asset.params.len(), 6);
    let value = |id: &str| migrated.get_param_by_id(id).unwrap().value.clone();
    assert_eq!(value("email"), "example.migration@mailinator.com");
    assert_eq!(value("num_licensed_users"), "10");
    assert_eq!(value("reseller_id"), "");
    assert_eq!(value("team_id"), "dbtid:AADaQq_w53nMDQbIPM_X123456PuzpcM2BI");
    assert_eq!(value("team_name"), "Migration Team");

    assert_eq!(
        logger.messages(LogLevel::Info),
        [
            tagged("Running migration operations for request PR-7001-1234-5678"),
            tagged(
                "5 processed, 4 succeeded (email, num_licensed_users, team_id, team_name), \
                 0 failed, 1 skipped (reseller_id)."
            ),
        ]
    );
    assert_eq!(logger.messages(LogLevel::Debug).len(), 2);
    assert!(logger.messages(LogLevel::Error).is_empty());
}

#[test]
fn test_migration_direct_serialize() {
    let request = load_request("request.migrate.direct.notserialized.json");
    let (handler, logger) = handler(MigrationConfig::builder().serialize(true).build());

    let migrated = handler.migrate_with_outcome(&request).unwrap().unwrap();

    assert_eq!(
        migrated.request.get_param_by_id("email").unwrap().value,
        "example.migration@mailinator.com"
    );
    assert_eq!(
        migrated.request.get_param_by_id("team_name").unwrap().value,
        r#"["Some name"]"#
    );
    assert_eq!(
        migrated.outcome.outcome_of("team_name"),
        Some(ParamOutcome::Succeeded)
    );
    assert_eq!(
        logger.messages(LogLevel::Info),
        [
            tagged("Running migration operations for request PR-7001-1234-5678"),
            tagged(
                "5 processed, 2 succeeded (email, team_name), 0 failed, \
                 3 skipped (num_licensed_users, reseller_id, team_id)."
            ),
        ]
    );
    assert_eq!(
        logger.messages(LogLevel::Debug),
        [
            tagged(
                "Migration data `migration_info`: {\
                 \"email\":\"example.migration@mailinator.com\",\
                 \"team_name\":[\"Some name\"]}"
            ),
            tagged("Migration data `migration_info` parsed correctly"),
        ]
    );
}

#[test]
fn test_migration_direct_no_serialize() {
    let request = load_request("request.migrate.direct.notserialized.json");
    let (handler, logger) = handler(MigrationConfig::default());

    let err = handler.migrate(&request).unwrap_err();

    let abort = err.as_abort().expect("Should be an abort");
    assert_eq!(abort.failed_params(), ["team_name"]);
    assert_eq!(
        logger.messages(LogLevel::Info),
        [
            tagged("Running migration operations for request PR-7001-1234-5678"),
            tagged(
                "5 processed, 1 succeeded (email), 1 failed (team_name), \
                 3 skipped (num_licensed_users, reseller_id, team_id)."
            ),
        ]
    );
    assert_eq!(logger.messages(LogLevel::Debug).len(), 2);
    assert_eq!(
        logger.messages(LogLevel::Error),
        [
            tagged("Parameter team_name type must be str, but list was given"),
            tagged(
                "Processing of parameters team_name failed, unable to complete migration."
            ),
        ]
    );
    // The caller's request is untouched.
    assert_eq!(request.get_param_by_id("email").unwrap().value, "");
}

#[test]
fn test_migration_transform() {
    let request = load_request("request.migrate.transformation.json");
    let (handler, logger) = handler(uppercase_transformations());

    let migrated = handler.migrate(&request).unwrap();

    let value = |id: &str| migrated.get_param_by_id(id).unwrap().value.clone();
    assert_eq!(value("email"), "EXAMPLE.MIGRATION@MAILINATOR.COM");
    assert_eq!(value("num_licensed_users"), "100");
    assert_eq!(value("reseller_id"), "");
    assert_eq!(value("team_id"), "DBTID:AADAQQ_W53NMDQBIPM_X123456PUZPCM2BI");
    assert_eq!(value("team_name"), "MIGRATION TEAM");

    assert_eq!(
        logger.messages(LogLevel::Info),
        [
            tagged("Running migration operations for request PR-7001-1234-5678"),
            tagged("Running transformation for parameter email"),
            tagged("Running transformation for parameter num_licensed_users"),
            tagged("Running transformation for parameter team_id"),
            tagged("Running transformation for parameter team_name"),
            tagged(
                "5 processed, 4 succeeded (email, num_licensed_users, team_id, team_name), \
                 0 failed, 1 skipped (reseller_id)."
            ),
        ]
    );
    assert_eq!(logger.messages(LogLevel::Debug).len(), 2);
}

#[test]
fn test_migration_transform_manual_fail() {
    let request = load_request("request.migrate.transformation.json");
    let config = MigrationConfig::builder()
        .transformation(
            "email",
            from_fn(|_: &Payload, _: &str| Err(MigrationParamError::new("Manual fail.").into())),
        )
        .build();
    let (handler, logger) = handler(config);

    let err = handler.migrate(&request).unwrap_err();

    assert!(err.is_abort());
    assert_eq!(
        logger.messages(LogLevel::Info),
        [
            tagged("Running migration operations for request PR-7001-1234-5678"),
            tagged("Running transformation for parameter email"),
            tagged(
                "5 processed, 0 succeeded, 1 failed (email), \
                 4 skipped (num_licensed_users, reseller_id, team_id, team_name)."
            ),
        ]
    );
    assert_eq!(
        logger.messages(LogLevel::Error),
        [
            tagged("Manual fail."),
            tagged("Processing of parameters email failed, unable to complete migration."),
        ]
    );
}

#[test]
fn test_failing_parameter_does_not_stop_the_rest() {
    let request = load_request("request.migrate.transformation.json");
    let config = MigrationConfig::builder()
        .transformation(
            "email",
            from_fn(|data: &Payload, _: &str| Ok(field(data, "noSuchField")?.to_string())),
        )
        .transformation(
            "team_name",
            from_fn(|data: &Payload, _: &str| Ok(field(data, "teamName")?.to_string())),
        )
        .build();
    let (handler, logger) = handler(config);

    let err = handler.migrate(&request).unwrap_err();

    match err {
        MigrationError::Abort(MigrationAbortError::ParametersFailed { outcome }) => {
            assert_eq!(outcome.failed(), ["email"]);
            assert_eq!(outcome.succeeded(), ["team_name"]);
            assert_eq!(
                outcome.skipped(),
                ["num_licensed_users", "reseller_id", "team_id"]
            );
            assert_eq!(outcome.processed().len(), 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        logger.messages(LogLevel::Error)[0],
        tagged("Migration data has no field `noSuchField`")
    );
}

#[test]
fn test_custom_migration_key() {
    let mut request = load_request("request.migrate.direct.success.json");
    for param in &mut request.asset.params {
        if param.id == "migration_info" {
            param.id = "legacy_data".to_string();
        }
    }
    let (handler, logger) = handler(MigrationConfig::builder().migration_key("legacy_data").build());

    let migrated = handler.migrate(&request).unwrap();

    assert_eq!(
        migrated.get_param_by_id("team_name").unwrap().value,
        "Migration Team"
    );
    assert_eq!(
        logger.messages(LogLevel::Debug)[1],
        tagged("Migration data `legacy_data` parsed correctly")
    );
}

#[test]
fn test_serialized_values_match_legacy_encoding() {
    let request = AssetRequest::new(
        REQUEST_ID,
        "AS-146-621-424-3",
        vec![
            Param::new("team_name", ""),
            Param::new(
                "migration_info",
                r#"{"team_name":["a","b"],"meta":{"k":1,"city":"Zürich"}}"#,
            ),
            Param::new("meta", ""),
        ],
    );
    let (handler, _) = handler(MigrationConfig::builder().serialize(true).build());

    let migrated = handler.migrate(&request).unwrap();

    assert_eq!(
        migrated.get_param_by_id("team_name").unwrap().value,
        r#"["a", "b"]"#
    );
    assert_eq!(
        migrated.get_param_by_id("meta").unwrap().value,
        r#"{"k": 1, "city": "Z\u00fcrich"}"#
    );
}

#[test]
fn test_number_type_name_in_error() {
    let request = AssetRequest::new(
        REQUEST_ID,
        "AS-146-621-424-3",
        vec![
            Param::new("num_licensed_users", ""),
            Param::new("migration_info", r#"{"num_licensed_users":10}"#),
        ],
    );
    let (handler, logger) = handler(MigrationConfig::default());

    handler.migrate(&request).unwrap_err();

    assert_eq!(
        logger.messages(LogLevel::Error)[0],
        tagged("Parameter num_licensed_users type must be str, but int was given")
    );
}
