use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        catalog::{CategoryList, NutritionList, PaymentMethodList},
        products::{ProductList, ProductView},
        sales::{SaleList, SaleWithLines},
        users::UserList,
    },
    models::{
        Category, NutritionFacts, PaymentMethod, Product, Sale, SaleLine, StockStatus, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, catalog, health, params, products, sales, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        catalog::list_categories,
        catalog::get_category,
        catalog::create_category,
        catalog::update_category,
        catalog::delete_category,
        catalog::list_nutrition,
        catalog::get_nutrition,
        catalog::create_nutrition,
        catalog::update_nutrition,
        catalog::delete_nutrition,
        catalog::list_payment_methods,
        catalog::create_payment_method,
        catalog::delete_payment_method,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        users::list_users,
        users::get_user,
        users::update_user,
        sales::list_sales,
        sales::get_sale,
        sales::submit_sale,
        sales::update_sale_status,
        admin::restock_products,
        admin::mark_products_out_of_stock,
        admin::mark_sales_paid,
        admin::mark_sales_delivered
    ),
    components(
        schemas(
            User,
            Category,
            NutritionFacts,
            PaymentMethod,
            Product,
            StockStatus,
            Sale,
            SaleLine,
            ProductView,
            ProductList,
            CategoryList,
            NutritionList,
            PaymentMethodList,
            UserList,
            SaleList,
            SaleWithLines,
            admin::BulkSelectRequest,
            admin::BulkActionResult,
            params::Pagination,
            params::ProductQuery,
            params::SaleListQuery,
            Meta,
            ApiResponse<ProductView>,
            ApiResponse<ProductList>,
            ApiResponse<SaleList>,
            ApiResponse<SaleWithLines>,
            ApiResponse<admin::BulkActionResult>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Catalog", description = "Categories, nutrition facts and payment methods"),
        (name = "Products", description = "Product endpoints"),
        (name = "Users", description = "User account endpoints"),
        (name = "Sales", description = "Sales and line items"),
        (name = "Admin", description = "Bulk admin actions"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
