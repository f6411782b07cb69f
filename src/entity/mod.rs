pub mod addresses;
pub mod audit_logs;
pub mod categories;
pub mod nutrition_facts;
pub mod payment_methods;
pub mod products;
pub mod roles;
pub mod sale_lines;
pub mod sales;
pub mod users;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use nutrition_facts::Entity as NutritionFacts;
pub use payment_methods::Entity as PaymentMethods;
pub use products::Entity as Products;
pub use roles::Entity as Roles;
pub use sale_lines::Entity as SaleLines;
pub use sales::Entity as Sales;
pub use users::Entity as Users;
