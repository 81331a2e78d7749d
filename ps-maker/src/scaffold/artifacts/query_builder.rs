//! Query builder generator

use super::{render_class, Artifact, ArtifactGenerator, ArtifactKind, GridContext};
use crate::error::Result;
use crate::scaffold::naming::IdentifierSet;
use crate::scaffold::property::PropertyDescriptor;
use crate::scaffold::services::build_service;
use crate::templates::{TemplateRenderer, QUERY_BUILDER};
use serde_json::json;

/// Select list: primary key first, then every property, alias qualified
///
/// # Examples
///
/// ```
/// # use ps_maker::scaffold::artifacts::select_statement;
/// # use ps_maker::scaffold::naming::{EntityName, IdentifierSet};
/// # use ps_maker::scaffold::property::PropertyDescriptor;
/// let ids = IdentifierSet::derive(&EntityName::parse("Customer").unwrap());
/// let properties = [
///     PropertyDescriptor::new("firstname", "string"),
///     PropertyDescriptor::new("lastname", "string"),
/// ];
/// assert_eq!(
///     select_statement(&ids, &properties),
///     "c.id_customer, c.firstname, c.lastname"
/// );
/// ```
#[must_use]
pub fn select_statement(ids: &IdentifierSet, properties: &[PropertyDescriptor]) -> String {
    let alias = &ids.table_alias;
    std::iter::once(ids.primary_key())
        .chain(properties.iter().map(PropertyDescriptor::field))
        .map(|column| format!("{alias}.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generates the query builder class and its service
pub struct QueryBuilderGenerator;

impl ArtifactGenerator for QueryBuilderGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::QueryBuilder
    }

    fn generate(&self, ctx: &GridContext<'_>, templates: &dyn TemplateRenderer) -> Result<Artifact> {
        let variables = json!({
            "table_alias": ctx.ids.table_alias,
            "table_name": ctx.ids.snake_case,
            "primary_key": ctx.ids.primary_key(),
            "select_statement": select_statement(ctx.ids, ctx.properties),
        });

        let file = render_class(ctx, templates, self.kind(), QUERY_BUILDER, variables)?;

        Ok(Artifact {
            kind: self.kind(),
            file: Some(file),
            service: build_service(self.kind(), ctx.ids, ctx.layout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::artifacts::test_support::Fixture;
    use crate::scaffold::naming::EntityName;
    use crate::templates::TemplateRegistry;

    #[test]
    fn test_select_statement_for_customer() {
        let fixture = Fixture::customer();
        assert_eq!(
            select_statement(&fixture.ids, &fixture.properties),
            "c.id_customer, c.firstname, c.lastname"
        );
    }

    #[test]
    fn test_select_statement_keeps_property_order() {
        let ids = IdentifierSet::derive(&EntityName::parse("OrderDetail").unwrap());
        let properties = [
            PropertyDescriptor::new("productQuantity", "int"),
            PropertyDescriptor::new("idOrder", "int"),
            PropertyDescriptor::new("product_name", "string"),
        ];
        assert_eq!(
            select_statement(&ids, &properties),
            "od.id_order_detail, od.product_quantity, od.id_order, od.product_name"
        );
    }

    #[test]
    fn test_select_statement_without_properties() {
        let ids = IdentifierSet::derive(&EntityName::parse("Carrier").unwrap());
        assert_eq!(select_statement(&ids, &[]), "c.id_carrier");
    }

    #[test]
    fn test_generate_query_builder() {
        let fixture = Fixture::customer();
        let templates = TemplateRegistry::new().unwrap();
        let artifact = QueryBuilderGenerator.generate(&fixture.context(), &templates).unwrap();

        let file = artifact.file.unwrap();
        assert_eq!(file.path.to_string_lossy(), "src/Core/Grid/Query/CustomerQueryBuilder.php");
        assert!(file.content.contains("$qb->select('c.id_customer, c.firstname, c.lastname')"));
        assert!(file.content.contains("->from($this->dbPrefix . 'customer', 'c')"));
        assert!(file.content.contains("COUNT(c.id_customer)"));

        let service = artifact.service.unwrap();
        assert_eq!(service.id, "prestashop.core.grid.query.customer_query_builder");
        assert_eq!(service.arguments.len(), 2);
    }
}
