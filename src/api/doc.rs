//! OpenAPI document for the catalog routes.
//!
//! Entity routes are mapped generically at runtime, so their operations are
//! added to the document per URL segment instead of through `#[utoipa::path]`.

use utoipa::openapi::path::{
    HttpMethod, OperationBuilder, Parameter, ParameterBuilder, ParameterIn,
};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{ArrayBuilder, KnownFormat, ObjectBuilder, SchemaFormat, Type};
use utoipa::openapi::{
    Content, ContentBuilder, Ref, RefOr, Required, Response, ResponseBuilder, Schema,
};
use utoipa::{OpenApi, ToSchema};

use crate::api::handlers::diagnostics::ERROR_PATH;
use crate::api::handlers::{CATEGORIES_SEGMENT, PRODUCTS_SEGMENT};
use crate::models::{Category, Product};

pub const PRODUCT_TAG: &str = "Products";
pub const CATEGORY_TAG: &str = "Categories";
pub const DIAGNOSTICS_TAG: &str = "Diagnostics";

/// Path of the generated document.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Mount point of the Swagger UI.
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "catalog-rs",
        description = "Products and categories catalog API",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::Product,
            crate::models::Category,
        )
    ),
    tags(
        (name = PRODUCT_TAG, description = "Product endpoints"),
        (name = CATEGORY_TAG, description = "Category endpoints"),
        (name = DIAGNOSTICS_TAG, description = "Diagnostic endpoints"),
    )
)]
pub struct ApiDoc;

/// Full document: static components plus the generated entity and diagnostic paths.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    add_entity_paths::<Product>(&mut doc, PRODUCTS_SEGMENT, PRODUCT_TAG);
    add_entity_paths::<Category>(&mut doc, CATEGORIES_SEGMENT, CATEGORY_TAG);

    doc.paths.add_path_operation(
        ERROR_PATH,
        vec![HttpMethod::Get],
        OperationBuilder::new()
            .tag(DIAGNOSTICS_TAG)
            .operation_id(Some("raise_error"))
            .summary(Some("Fail on purpose"))
            .response("500", error_response("The request failed"))
            .build(),
    );
    doc
}

fn add_entity_paths<T: ToSchema>(doc: &mut utoipa::openapi::OpenApi, segment: &str, tag: &str) {
    let schema = T::name();
    let collection = format!("/{}", segment);
    let item = format!("/{}/{{id}}", segment);

    doc.paths.add_path_operation(
        &collection,
        vec![HttpMethod::Get],
        operation(tag, format!("list_{}", segment), format!("List all {}", segment))
            .response(
                "200",
                json_response(
                    &format!("Every stored {}", schema),
                    RefOr::T(Schema::Array(
                        ArrayBuilder::new()
                            .items(Ref::from_schema_name(schema.as_ref()))
                            .build(),
                    )),
                ),
            )
            .build(),
    );

    doc.paths.add_path_operation(
        &collection,
        vec![HttpMethod::Post],
        operation(tag, format!("add_{}", segment), format!("Store a {}", schema))
            .request_body(Some(
                RequestBodyBuilder::new()
                    .content("application/json", schema_content(&schema))
                    .required(Some(Required::True))
                    .build(),
            ))
            .response(
                "200",
                json_response(
                    &format!("The stored {}", schema),
                    Ref::from_schema_name(schema.as_ref()).into(),
                ),
            )
            .response("400", error_response("Malformed or invalid body"))
            .response("409", error_response("Id already in use"))
            .build(),
    );

    doc.paths.add_path_operation(
        &item,
        vec![HttpMethod::Get],
        operation(tag, format!("get_{}", segment), format!("Get a {} by id", schema))
            .parameter(id_parameter())
            .response(
                "200",
                json_response(
                    &format!("The {}", schema),
                    Ref::from_schema_name(schema.as_ref()).into(),
                ),
            )
            .response("400", error_response("Id is not an integer"))
            .response("404", error_response("No entity with this id"))
            .build(),
    );

    doc.paths.add_path_operation(
        &item,
        vec![HttpMethod::Delete],
        operation(tag, format!("delete_{}", segment), format!("Delete a {} by id", schema))
            .parameter(id_parameter())
            .response(
                "200",
                ResponseBuilder::new()
                    .description("Deleted, or nothing to delete")
                    .build(),
            )
            .response("400", error_response("Id is not an integer"))
            .build(),
    );
}

fn operation(tag: &str, operation_id: String, summary: String) -> OperationBuilder {
    OperationBuilder::new()
        .tag(tag)
        .operation_id(Some(operation_id))
        .summary(Some(summary))
}

fn id_parameter() -> Parameter {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .schema(Some(RefOr::T(Schema::Object(
            ObjectBuilder::new()
                .schema_type(Type::Integer)
                .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int32)))
                .build(),
        ))))
        .build()
}

fn schema_content(schema: &str) -> Content {
    ContentBuilder::new()
        .schema(Some(Ref::from_schema_name(schema)))
        .build()
}

fn json_response(description: &str, schema: RefOr<Schema>) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content("application/json", ContentBuilder::new().schema(Some(schema)).build())
        .build()
}

fn error_response(description: &str) -> Response {
    json_response(description, Ref::from_schema_name("ErrorResponse").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_has_eight_entity_operations_and_error() {
        let doc = openapi();
        for segment in [PRODUCTS_SEGMENT, CATEGORIES_SEGMENT] {
            let collection = format!("/{}", segment);
            let item = format!("/{}/{{id}}", segment);
            assert!(doc.paths.get_path_operation(&collection, HttpMethod::Get).is_some());
            assert!(doc.paths.get_path_operation(&collection, HttpMethod::Post).is_some());
            assert!(doc.paths.get_path_operation(&item, HttpMethod::Get).is_some());
            assert!(doc.paths.get_path_operation(&item, HttpMethod::Delete).is_some());
        }
        assert!(doc.paths.get_path_operation(ERROR_PATH, HttpMethod::Get).is_some());
    }

    #[test]
    fn test_document_registers_schemas() {
        let doc = openapi();
        let schemas = &doc.components.expect("components").schemas;
        for name in ["Product", "Category", "ErrorResponse"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }
}
