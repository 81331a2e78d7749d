//! Integration tests for grid generation against a project on disk

use proptest::prelude::*;
use ps_maker::config::MakerConfig;
use ps_maker::scaffold::destination::{Destination, Layout};
use ps_maker::scaffold::naming::{EntityName, IdentifierSet};
use ps_maker::scaffold::property::PropertyDescriptor;
use ps_maker::scaffold::{GridGenerator, GridRequest, ReportStatus};
use ps_maker::templates::TemplateRegistry;
use ps_maker::testing::{InMemoryServiceStore, InMemoryWorkspace};
use ps_maker::workspace::{ProjectWorkspace, ServiceConflictPolicy, UpsertOutcome, YamlServiceStore};
use ps_maker::MakerError;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONTROLLER_PATH: &str = "src/PrestaShopBundle/Controller/Admin/CustomerController.php";
const SERVICES_PATH: &str = "src/PrestaShopBundle/Resources/config/services/core/grid.yml";

const EXISTING_CONTROLLER: &str = "<?php

namespace PrestaShopBundle\\Controller\\Admin;

use Symfony\\Component\\HttpFoundation\\Request;

/**
 * Handles customer pages; braces in strings must not confuse the parser: \"}\"
 */
class CustomerController extends FrameworkBundleAdminController
{
    private const TAB = 'AdminCustomers';

    public function editAction(Request $request, int $customerId)
    {
        // closing brace in a comment }
        $label = \"{$customerId}\";

        return $this->redirectToRoute('admin_customers_index', ['label' => $label]);
    }
}
";

fn customer_request() -> GridRequest {
    GridRequest::new("Customer")
        .with_properties(PropertyDescriptor::parse_all(&["firstname", "lastname", "email"]).unwrap())
        .with_translation_domain("Admin.Customers.Feature")
}

fn run_on_disk(root: &Path, request: &GridRequest) -> ps_maker::Result<ps_maker::scaffold::CommitReport> {
    let config = MakerConfig::load(root, None)?;
    let layout = config.layout(Destination::Root);
    let templates = TemplateRegistry::new()?;
    let generator = GridGenerator::new(layout.clone(), &templates);

    let mut sources = ProjectWorkspace::new(root, layout.clone());
    let mut services =
        YamlServiceStore::load(root.join(layout.services_file()), config.services.on_conflict)?;
    generator.run(request, &mut sources, &mut services)
}

/// Test that a fresh project receives every artifact and service
#[test]
fn test_customer_grid_on_disk() {
    let temp = TempDir::new().unwrap();

    let report = run_on_disk(temp.path(), &customer_request()).unwrap();

    let expected = [
        "src/Core/Grid/Definition/Factory/CustomerGridDefinitionFactory.php",
        "src/Core/Search/Filters/CustomerFilters.php",
        "src/Core/Grid/Query/CustomerQueryBuilder.php",
        CONTROLLER_PATH,
        "src/PrestaShopBundle/Resources/views/Admin/Customer/index.html.twig",
    ];
    for path in expected {
        assert!(temp.path().join(path).is_file(), "File should exist: {path}");
    }
    assert_eq!(report.files.len(), expected.len());

    let definition = fs::read_to_string(temp.path().join(expected[0])).unwrap();
    assert!(definition.contains("class CustomerGridDefinitionFactory"));
    assert!(definition.contains("GRID_ID = 'customers'"));
    assert!(definition.contains("Admin.Customers.Feature"));
    let firstname = definition.find("'firstname'").unwrap();
    let email = definition.find("'email'").unwrap();
    assert!(firstname < email, "Columns should keep their order");

    let query = fs::read_to_string(temp.path().join(expected[2])).unwrap();
    assert!(query.contains("c.id_customer, c.firstname, c.lastname, c.email"));

    let controller = fs::read_to_string(temp.path().join(CONTROLLER_PATH)).unwrap();
    assert!(controller.contains("class CustomerController extends FrameworkBundleAdminController"));
    assert!(controller.contains("public function indexAction("));
    assert!(controller.contains("prestashop.core.grid.factory.customer"));
    assert!(controller.contains("@PrestaShop/Admin/Customer/index.html.twig"));

    let services = fs::read_to_string(temp.path().join(SERVICES_PATH)).unwrap();
    for id in [
        "prestashop.core.grid.definition.factory.customer",
        "prestashop.core.grid.query.customer_query_builder",
        "prestashop.core.grid.data.factory.customer_data_factory",
        "prestashop.core.grid.factory.customer",
    ] {
        assert!(services.contains(id), "Service should be registered: {id}");
    }
    assert!(report
        .services
        .iter()
        .all(|(_, outcome)| *outcome == UpsertOutcome::Inserted));
}

/// Test that running twice leaves the controller and services alone
#[test]
fn test_rerun_is_idempotent() {
    let temp = TempDir::new().unwrap();
    run_on_disk(temp.path(), &customer_request()).unwrap();
    let controller = fs::read_to_string(temp.path().join(CONTROLLER_PATH)).unwrap();
    let services = fs::read_to_string(temp.path().join(SERVICES_PATH)).unwrap();

    let report = run_on_disk(temp.path(), &customer_request()).unwrap();

    assert_eq!(fs::read_to_string(temp.path().join(CONTROLLER_PATH)).unwrap(), controller);
    assert_eq!(fs::read_to_string(temp.path().join(SERVICES_PATH)).unwrap(), services);
    assert_eq!(controller.matches("function indexAction").count(), 1);
    assert!(report
        .entries
        .iter()
        .any(|entry| entry.status == ReportStatus::Unchanged));
    assert!(report
        .services
        .iter()
        .all(|(_, outcome)| *outcome == UpsertOutcome::Unchanged));
}

/// Test that an existing controller only gains lines
#[test]
fn test_existing_controller_is_augmented_by_pure_insertion() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONTROLLER_PATH);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, EXISTING_CONTROLLER).unwrap();

    let report = run_on_disk(temp.path(), &customer_request()).unwrap();

    let augmented = fs::read_to_string(&path).unwrap();
    let diff = TextDiff::from_lines(EXISTING_CONTROLLER, augmented.as_str());
    assert!(
        diff.iter_all_changes().all(|change| change.tag() != ChangeTag::Delete),
        "No original line may be removed or changed"
    );
    let inserted: String = diff
        .iter_all_changes()
        .filter(|change| change.tag() == ChangeTag::Insert)
        .map(|change| change.value().to_string())
        .collect();
    assert!(inserted.contains("public function indexAction("));
    assert!(augmented.contains("public function editAction(Request $request, int $customerId)"));
    assert!(augmented.trim_end().ends_with('}'));
    assert!(augmented.find("editAction").unwrap() < augmented.find("indexAction").unwrap());

    let entry = report
        .entries
        .iter()
        .find(|entry| entry.status == ReportStatus::Augmented)
        .unwrap();
    assert_eq!(entry.target, CONTROLLER_PATH);
}

/// Test that an existing index action, in any letter case, is left alone
#[test]
fn test_existing_action_is_detected_case_insensitively() {
    let source = EXISTING_CONTROLLER.replace("editAction", "INDEXACTION");
    let layout = Layout::new(Destination::Root);
    let mut sources = InMemoryWorkspace::new(layout.clone());
    sources.insert_file(CONTROLLER_PATH, source.clone());
    let mut services = InMemoryServiceStore::new();
    let templates = TemplateRegistry::new().unwrap();

    GridGenerator::new(layout, &templates)
        .run(&customer_request(), &mut sources, &mut services)
        .unwrap();

    assert_eq!(sources.file(CONTROLLER_PATH), Some(source.as_str()));
    assert!(!sources
        .writes()
        .iter()
        .any(|path| path.ends_with("CustomerController.php")));
}

/// Test that an invalid entity name aborts before any write
#[test]
fn test_invalid_entity_writes_nothing() {
    let temp = TempDir::new().unwrap();

    for name in ["", "   ", "9Lives", "Order-Detail"] {
        let err = run_on_disk(temp.path(), &GridRequest::new(name)).unwrap_err();
        assert!(
            matches!(err, MakerError::InvalidIdentifier(_)),
            "Name should be rejected: {name:?}"
        );
    }
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

/// Test that a controller that cannot be parsed is reported and skipped
#[test]
fn test_unparsable_controller_is_skipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONTROLLER_PATH);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let broken = "<?php\nclass CustomerController\n{\n    public function editAction()\n    {\n";
    fs::write(&path, broken).unwrap();

    let report = run_on_disk(temp.path(), &customer_request()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].is_recoverable());
    assert_eq!(report.files.len(), 4);
    assert!(temp.path().join(SERVICES_PATH).is_file());
}

fn run_module_on_disk(root: &Path) -> ps_maker::Result<ps_maker::scaffold::CommitReport> {
    let config = MakerConfig::load(root, None)?;
    let layout = config.layout(Destination::from_module(Some("kjgrid"))?);
    let templates = TemplateRegistry::new()?;
    let generator = GridGenerator::new(layout.clone(), &templates);
    let request = GridRequest::new("OrderDetail").with_properties(PropertyDescriptor::parse_all(&[
        "product_name",
        "product_quantity:int",
    ])?);

    let mut sources = ProjectWorkspace::new(root, layout.clone());
    let mut services = YamlServiceStore::load(
        root.join(layout.services_file()),
        ServiceConflictPolicy::Overwrite,
    )?;
    generator.run(&request, &mut sources, &mut services)
}

const MODULE_SERVICES_PATH: &str = "modules/kjgrid/config/services.yml";
const MODULE_QUERY_PATH: &str = "modules/kjgrid/src/Grid/Query/OrderDetailQueryBuilder.php";

/// Test that a module destination uses its own namespace, prefix and files
#[test]
fn test_module_grid_on_disk() {
    let temp = TempDir::new().unwrap();
    run_module_on_disk(temp.path()).unwrap();

    let module = temp.path().join("modules/kjgrid");
    let query = fs::read_to_string(temp.path().join(MODULE_QUERY_PATH)).unwrap();
    assert!(query.contains("namespace PrestaShop\\Module\\Kjgrid\\Grid\\Query;"));
    assert!(query.contains("od.id_order_detail, od.product_name, od.product_quantity"));

    let controller =
        fs::read_to_string(module.join("src/Controller/Admin/OrderDetailController.php")).unwrap();
    assert!(controller.contains("'Modules.Kjgrid.Admin'"));

    assert!(module.join("views/Admin/OrderDetail/index.html.twig").is_file());
    let services = fs::read_to_string(temp.path().join(MODULE_SERVICES_PATH)).unwrap();
    let document: serde_yaml::Value = serde_yaml::from_str(&services).unwrap();
    let ids: Vec<&str> = document["services"]
        .as_mapping()
        .unwrap()
        .keys()
        .filter_map(serde_yaml::Value::as_str)
        .collect();
    assert_eq!(ids.len(), 4);
    assert!(ids.contains(&"kjgrid.grid.factory.order_detail"));
    assert!(
        ids.iter().all(|id| id.starts_with("kjgrid.")),
        "Module services should use the module prefix: {ids:?}"
    );
}

/// Test that a re-run keeps a generated file the developer has edited
#[test]
fn test_rerun_keeps_edited_generated_files() {
    let temp = TempDir::new().unwrap();
    run_module_on_disk(temp.path()).unwrap();
    let query_path = temp.path().join(MODULE_QUERY_PATH);
    let edited = format!(
        "{}// custom filter kept by hand\n",
        fs::read_to_string(&query_path).unwrap()
    );
    fs::write(&query_path, &edited).unwrap();

    let report = run_module_on_disk(temp.path()).unwrap();

    assert_eq!(fs::read_to_string(&query_path).unwrap(), edited);
    assert!(report.files.is_empty(), "Nothing should be rewritten: {:?}", report.files);
    let entry = report
        .entries
        .iter()
        .find(|entry| entry.target.ends_with("OrderDetailQueryBuilder.php"))
        .unwrap();
    assert_eq!(entry.status, ReportStatus::Unchanged);
    assert!(entry.description.ends_with("already present"));
}

/// Test that registering services keeps the comments of a hand-written file
#[test]
fn test_module_services_keep_their_comments() {
    let temp = TempDir::new().unwrap();
    let services_path = temp.path().join(MODULE_SERVICES_PATH);
    fs::create_dir_all(services_path.parent().unwrap()).unwrap();
    let hand_written = "# Hand-written module services\nservices:\n  # keep this note\n  kjgrid.hook.listener:\n    class: 'PrestaShop\\Module\\Kjgrid\\Listener'\n";
    fs::write(&services_path, hand_written).unwrap();

    run_module_on_disk(temp.path()).unwrap();

    let services = fs::read_to_string(&services_path).unwrap();
    assert!(services.starts_with(hand_written));
    assert!(services.contains("# keep this note"));
    assert!(services.contains("kjgrid.grid.factory.order_detail:"));
}

/// Test that `keep` preserves a hand-edited service record
#[test]
fn test_keep_policy_preserves_existing_services() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("ps-maker.toml"),
        "[services]\non_conflict = \"keep\"\n",
    )
    .unwrap();
    let services_path = temp.path().join(SERVICES_PATH);
    fs::create_dir_all(services_path.parent().unwrap()).unwrap();
    let hand_edited = "services:\n  prestashop.core.grid.factory.customer:\n    class: App\\Grid\\MyFactory\n";
    fs::write(&services_path, hand_edited).unwrap();

    let report = run_on_disk(temp.path(), &customer_request()).unwrap();

    let (_, outcome) = report
        .services
        .iter()
        .find(|(id, _)| id == "prestashop.core.grid.factory.customer")
        .unwrap();
    assert_eq!(*outcome, UpsertOutcome::Kept);
    let services = fs::read_to_string(&services_path).unwrap();
    assert!(services.contains("App\\Grid\\MyFactory"));
    assert!(services.contains("prestashop.core.grid.definition.factory.customer"));
}

proptest! {
    /// Any valid entity yields five files and four services under the core prefix
    #[test]
    fn prop_every_entity_plans_a_full_grid(name in "[A-Z][a-z]{1,8}([A-Z][a-z]{1,8}){0,2}") {
        let layout = Layout::new(Destination::Root);
        let templates = TemplateRegistry::new().unwrap();
        let sources = InMemoryWorkspace::new(layout.clone());

        let plan = GridGenerator::new(layout, &templates)
            .plan(&GridRequest::new(name.as_str()), &sources)
            .unwrap();

        let ids = IdentifierSet::derive(&EntityName::parse(&name).unwrap());
        prop_assert_eq!(plan.files().len(), 5);
        prop_assert_eq!(plan.services().len(), 4);
        prop_assert!(plan
            .services()
            .iter()
            .all(|service| service.id.starts_with("prestashop.core.grid.")));
        let controller = plan.controller().unwrap();
        let expected_controller = format!("{}Controller.php", ids.class_name);
        prop_assert!(controller.path.ends_with(&expected_controller));
        prop_assert!(controller.original.is_none());
    }
}
