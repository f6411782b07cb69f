//! Role capabilities.
//!
//! Roles are a closed enumeration and every authorization decision goes
//! through the single capability table below, consulted by both the
//! request-path gate and the per-resource services.

use crate::error::AppError;

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_CLIENTE: &str = "Cliente";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Cliente,
    /// A role name this service does not know about. Treated like a
    /// regular back-office role: no Cliente restrictions apply.
    Other,
}

impl Role {
    pub fn parse(name: &str) -> Self {
        match name {
            ROLE_ADMIN => Role::Admin,
            ROLE_CLIENTE => Role::Cliente,
            _ => Role::Other,
        }
    }

    pub fn is_cliente(self) -> bool {
        self == Role::Cliente
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Sales,
    SaleLines,
    Products,
    Categories,
    Nutrition,
    PaymentMethods,
}

/// How much of a resource a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Module hidden entirely.
    None,
    /// Only rows the caller owns.
    Own,
    /// Everything.
    All,
}

/// The capability table. Staff and non-Cliente roles see everything;
/// Cliente callers get row-scoped access to their own account and sales
/// and no access at all to the catalog modules.
pub fn capability(role: Role, staff: bool, resource: Resource) -> Scope {
    if !role.is_cliente() {
        return Scope::All;
    }
    match resource {
        Resource::Users | Resource::Sales => Scope::Own,
        Resource::Categories | Resource::Products | Resource::Nutrition => Scope::None,
        Resource::SaleLines | Resource::PaymentMethods => {
            if staff {
                Scope::All
            } else {
                Scope::None
            }
        }
    }
}

/// Error out unless the caller may see at least some rows of `resource`.
pub fn require_module(role: Role, staff: bool, resource: Resource) -> Result<Scope, AppError> {
    match capability(role, staff, resource) {
        Scope::None => Err(AppError::Forbidden),
        scope => Ok(scope),
    }
}

/// Error out unless the caller has unrestricted access to `resource`.
pub fn require_all(role: Role, staff: bool, resource: Resource) -> Result<(), AppError> {
    match capability(role, staff, resource) {
        Scope::All => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cliente_cannot_see_catalog_modules() {
        for resource in [Resource::Categories, Resource::Products, Resource::Nutrition] {
            assert_eq!(capability(Role::Cliente, false, resource), Scope::None);
            // Hidden even when the Cliente account carries the staff flag.
            assert_eq!(capability(Role::Cliente, true, resource), Scope::None);
        }
    }

    #[test]
    fn cliente_sees_own_users_and_sales() {
        assert_eq!(capability(Role::Cliente, false, Resource::Users), Scope::Own);
        assert_eq!(capability(Role::Cliente, false, Resource::Sales), Scope::Own);
    }

    #[test]
    fn staff_cliente_gets_sale_lines_and_payment_methods() {
        assert_eq!(
            capability(Role::Cliente, true, Resource::SaleLines),
            Scope::All
        );
        assert_eq!(
            capability(Role::Cliente, false, Resource::PaymentMethods),
            Scope::None
        );
    }

    #[test]
    fn non_cliente_roles_are_unrestricted() {
        assert_eq!(capability(Role::Admin, false, Resource::Sales), Scope::All);
        assert_eq!(
            capability(Role::parse("Bodeguero"), false, Resource::Products),
            Scope::All
        );
    }

    #[test]
    fn role_parsing_is_closed() {
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse("Cliente"), Role::Cliente);
        assert_eq!(Role::parse("anything-else"), Role::Other);
    }
}
