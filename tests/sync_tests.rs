//! Schema synchronizer tests

use schema_compose::export::SchemaDocument;
use schema_compose::sync::{SyncError, from_config};
use schema_compose::{
    Attribute, Cardinality, Catalog, CommandSynchronizer, ConflictPolicy, FieldSet, RecordType,
    Relation, RelationshipValidationError, SchemaSynchronizer, ScriptSynchronizer, SyncConfig,
    prepare, validate_catalog,
};
use tempfile::TempDir;

fn post_catalog(with_user: bool) -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .define(FieldSet::new(
            "PostTrait",
            vec![Attribute::id("id")],
            vec![Relation::many_to_one("user", "User")],
        ))
        .unwrap();
    catalog
        .register(RecordType::new("Post").uses("PostTrait"))
        .unwrap();
    if with_user {
        catalog
            .register(RecordType::new("User").with_attribute(Attribute::id("id")))
            .unwrap();
    }
    catalog
}

mod prepare_tests {
    use super::*;

    #[test]
    fn test_post_resolves_when_user_defined() {
        let schemas = prepare(&post_catalog(true), ConflictPolicy::LastWins).unwrap();
        let post = schemas.iter().find(|s| s.record_type == "Post").unwrap();
        assert_eq!(post.relation("user").unwrap().target, "User");
    }

    #[test]
    fn test_post_unresolved_without_user() {
        let err = prepare(&post_catalog(false), ConflictPolicy::LastWins).unwrap_err();
        match err {
            SyncError::Relationship(RelationshipValidationError::UnresolvedRelationship {
                record,
                relation,
                target,
            }) => {
                assert_eq!(record, "Post");
                assert_eq!(relation, "user");
                assert_eq!(target, "User");
            }
            other => panic!("expected unresolved relationship, got {:?}", other),
        }
    }

    #[test]
    fn test_one_to_many_without_mapped_by_still_prepares() {
        let mut catalog = post_catalog(false);
        catalog
            .register(
                RecordType::new("User")
                    .with_attribute(Attribute::id("id"))
                    .with_relation(Relation::new("posts", "Post", Cardinality::OneToMany)),
            )
            .unwrap();

        let schemas = prepare(&catalog, ConflictPolicy::LastWins).unwrap();
        assert_eq!(schemas.len(), 2);

        let report = validate_catalog(&catalog, ConflictPolicy::LastWins);
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.contains("posts")));
    }

    #[test]
    fn test_composition_errors_surface() {
        let mut catalog = post_catalog(true);
        catalog
            .register(RecordType::new("Ghost").uses("Missing"))
            .unwrap();
        assert!(matches!(
            prepare(&catalog, ConflictPolicy::LastWins).unwrap_err(),
            SyncError::Compose(_)
        ));
    }
}

mod script_tests {
    use super::*;

    #[test]
    fn test_script_from_config() {
        let temp = TempDir::new().unwrap();
        let config = SyncConfig::new()
            .with_script(temp.path().join("sync.sql"))
            .with_dialect("postgres");
        let synchronizer = from_config(&config);
        let schemas = prepare(&post_catalog(true), ConflictPolicy::LastWins).unwrap();

        let pending = synchronizer.pending_changes(&schemas).unwrap();
        assert_eq!(pending.len(), 3);
        assert!(pending[2].starts_with("ALTER TABLE \"post\""));

        let report = synchronizer.apply(&schemas).unwrap();
        assert!(report.applied);
        assert_eq!(report.statements, pending);
        let script = std::fs::read_to_string(temp.path().join("sync.sql")).unwrap();
        assert!(script.contains(&report.fingerprint));
    }

    #[test]
    fn test_script_path_accessor() {
        let script = ScriptSynchronizer::new("out.sql", "standard");
        assert_eq!(script.path(), std::path::Path::new("out.sql"));
        assert_eq!(script.recorded_fingerprint(), None);
    }
}

#[cfg(unix)]
mod command_tests {
    use super::*;

    const FAKE_SYNCHRONIZER: &str = r#"cat > "$0"
case "$1" in
  --dump-sql) printf 'CREATE TABLE post (id INT);\nALTER TABLE post ADD COLUMN title TEXT;\n' ;;
  --force) echo "Updating database schema... 2 queries were executed" ;;
  *) echo "unknown mode $1" >&2; exit 3 ;;
esac"#;

    fn synchronizer(capture: &std::path::Path) -> CommandSynchronizer {
        CommandSynchronizer::new("sh").with_args(vec![
            "-c".to_string(),
            FAKE_SYNCHRONIZER.to_string(),
            capture.display().to_string(),
        ])
    }

    #[test]
    fn test_dump_sql_reports_statements() {
        let temp = TempDir::new().unwrap();
        let capture = temp.path().join("stdin.json");
        let schemas = prepare(&post_catalog(true), ConflictPolicy::LastWins).unwrap();

        let statements = synchronizer(&capture).pending_changes(&schemas).unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE post"));

        let document: SchemaDocument =
            serde_json::from_str(&std::fs::read_to_string(&capture).unwrap()).unwrap();
        assert_eq!(document.record_types, schemas);
    }

    #[test]
    fn test_force_applies() {
        let temp = TempDir::new().unwrap();
        let schemas = prepare(&post_catalog(true), ConflictPolicy::LastWins).unwrap();

        let report = synchronizer(&temp.path().join("stdin.json"))
            .apply(&schemas)
            .unwrap();
        assert!(report.applied);
        assert!(report.statements.is_empty());
        assert!(report.output.contains("2 queries were executed"));
    }

    #[test]
    fn test_failure_carries_status_and_stderr() {
        let temp = TempDir::new().unwrap();
        let schemas = prepare(&post_catalog(true), ConflictPolicy::LastWins).unwrap();

        let err = synchronizer(&temp.path().join("stdin.json"))
            .with_apply_args(vec!["--bogus".to_string()])
            .apply(&schemas)
            .unwrap_err();
        match err {
            SyncError::CommandFailed { status, stderr } => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "unknown mode --bogus");
            }
            other => panic!("expected command failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program() {
        let schemas = prepare(&post_catalog(true), ConflictPolicy::LastWins).unwrap();
        let err = CommandSynchronizer::new("schema-compose-no-such-program")
            .pending_changes(&schemas)
            .unwrap_err();
        assert!(matches!(err, SyncError::Spawn { .. }));
    }
}
