//! Manifest loading tests

use schema_compose::manifest::ManifestError;
use schema_compose::{
    Cardinality, Composer, ConflictPolicy, ManifestLoader, MappingConfig, Origin, Settings,
    StorageType, prepare,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

const USER_UNITS: &str = r#"
field_sets:
  - name: UserTrait
    attributes:
      - { name: id, type: integer, primary_key: true, generated: true }
      - { name: firstname, type: string(50) }
      - { name: lastname, type: string(50) }
      - { name: email, type: string, unique: true }
"#;

const SCHEMA: &str = r#"
include:
  - units/user.yaml
record_types:
  - name: App\Entity\User
    uses: [UserTrait]
  - name: App:User2
    uses: [UserTrait]
    attributes:
      - { name: firstname, type: string(100) }
      - { name: phone, type: string(20), nullable: true }
"#;

mod loader_tests {
    use super::*;

    #[test]
    fn test_load_with_includes_and_qualified_names() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "units/user.yaml", USER_UNITS);
        write(temp.path(), "schema.yaml", SCHEMA);

        let mapping = MappingConfig::new()
            .with_dir(temp.path())
            .with_prefix("App\\Entity")
            .with_alias("App");
        let catalog = ManifestLoader::new(&mapping).load_default().unwrap();

        let names: Vec<&str> = catalog
            .list_record_types()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["User", "User2"]);

        let user2 = Composer::new(&catalog).compose("User2").unwrap();
        assert_eq!(
            user2.attribute_names(),
            vec!["id", "firstname", "lastname", "email", "phone"]
        );
        assert_eq!(user2.attribute("firstname").unwrap().length, Some(100));
        assert!(user2.attribute("phone").unwrap().nullable);
        assert_eq!(user2.origin("lastname"), Some(&Origin::Unit("UserTrait".to_string())));
    }

    #[test]
    fn test_diamond_include_loaded_once() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "common.yaml",
            "field_sets:\n  - name: Base\n    attributes:\n      - { name: id, type: integer, primary_key: true }\n",
        );
        write(temp.path(), "a.yaml", "include: [common.yaml]\n");
        write(temp.path(), "b.yaml", "include: [common.yaml]\n");
        write(
            temp.path(),
            "schema.yaml",
            "include: [a.yaml, b.yaml]\nrecord_types:\n  - { name: Tag, uses: [Base] }\n",
        );

        let catalog = ManifestLoader::new(&MappingConfig::default())
            .load(temp.path().join("schema.yaml"))
            .unwrap();
        assert_eq!(catalog.field_sets.len(), 1);
        assert_eq!(catalog.record_types.len(), 1);
    }

    #[test]
    fn test_include_cycle_rejected() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.yaml", "include: [b.yaml]\n");
        write(temp.path(), "b.yaml", "include: [a.yaml]\n");

        let err = ManifestLoader::new(&MappingConfig::default())
            .load(temp.path().join("a.yaml"))
            .unwrap_err();
        match err {
            ManifestError::CircularInclude { chain } => {
                assert_eq!(chain.len(), 3);
                assert!(chain[0].ends_with("a.yaml"));
                assert!(chain[2].ends_with("a.yaml"));
            }
            other => panic!("expected circular include, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_include() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "schema.yaml", "include: [nowhere.yaml]\n");

        let err = ManifestLoader::new(&MappingConfig::default())
            .load(temp.path().join("schema.yaml"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "schema.yaml", "record_types: [ { name: User\n");

        let err = ManifestLoader::new(&MappingConfig::default())
            .load(temp.path().join("schema.yaml"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().contains("schema.yaml"));
    }

    #[test]
    fn test_duplicate_unit_across_files() {
        let temp = TempDir::new().unwrap();
        let unit = "field_sets:\n  - { name: Base }\n";
        write(temp.path(), "a.yaml", unit);
        write(temp.path(), "schema.yaml", &format!("include: [a.yaml]\n{}", unit));

        let err = ManifestLoader::new(&MappingConfig::default())
            .load(temp.path().join("schema.yaml"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::Registry(_)));
    }

    #[test]
    fn test_invalid_type() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "schema.yaml",
            "record_types:\n  - name: Shape\n    attributes:\n      - { name: area, type: geometry }\n",
        );

        let err = ManifestLoader::new(&MappingConfig::default())
            .load(temp.path().join("schema.yaml"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidType { .. }));
    }
}

mod post_tests {
    use super::*;

    const POST_UNITS: &str = r#"
field_sets:
  - name: PostTrait
    attributes:
      - { name: id, type: integer, primary_key: true, generated: true }
      - { name: title, type: string(200) }
      - { name: price, type: "decimal(10,2)", nullable: true }
    relations:
      - { name: user, target: User, cardinality: many_to_one, nullable: false }
record_types:
  - { name: Post, uses: [PostTrait] }
"#;

    #[test]
    fn test_post_prepares_with_user_defined() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "post.yaml", POST_UNITS);
        write(
            temp.path(),
            "schema.yaml",
            "include: [post.yaml]\nrecord_types:\n  - name: User\n    attributes:\n      - { name: id, type: integer, primary_key: true }\n",
        );

        let catalog = ManifestLoader::new(&MappingConfig::default())
            .load(temp.path().join("schema.yaml"))
            .unwrap();
        let schemas = prepare(&catalog, ConflictPolicy::LastWins).unwrap();

        let post = schemas.iter().find(|s| s.record_type == "Post").unwrap();
        let user = post.relation("user").unwrap();
        assert_eq!(user.cardinality, Cardinality::ManyToOne);
        assert!(!user.nullable);
        let price = post.attribute("price").unwrap();
        assert_eq!(price.storage_type, StorageType::Decimal);
        assert_eq!((price.precision, price.scale), (Some(10), Some(2)));
    }

    #[test]
    fn test_post_fails_without_user() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "schema.yaml", POST_UNITS);

        let catalog = ManifestLoader::new(&MappingConfig::default())
            .load(temp.path().join("schema.yaml"))
            .unwrap();
        let err = prepare(&catalog, ConflictPolicy::LastWins).unwrap_err();
        assert!(err.to_string().contains("unknown record type 'User'"));
    }
}

mod settings_tests {
    use super::*;

    #[test]
    fn test_settings_drive_manifest_location() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "defs/units/user.yaml", USER_UNITS);
        write(temp.path(), "defs/main.yaml", SCHEMA);
        write(
            temp.path(),
            "schema-compose.toml",
            "[mapping]\ndir = \"defs\"\nmanifest = \"main.yaml\"\nprefix = \"App\\\\Entity\"\nalias = \"App\"\n",
        );

        let settings = Settings::load(temp.path().join("schema-compose.toml")).unwrap();
        let catalog = ManifestLoader::new(&settings.mapping).load_default().unwrap();
        assert!(catalog.record_type("User").is_ok());
        assert!(catalog.record_type("User2").is_ok());
    }
}
