//! Default role → permission policy.

use crate::{Permission, Role};

/// Permissions granted by a set of roles. Unknown roles grant nothing.
pub fn permissions_for_roles(roles: &[Role]) -> Vec<Permission> {
    let mut granted: Vec<Permission> = Vec::new();
    for role in roles {
        for perm in permissions_for_role(role) {
            if !granted.contains(&perm) {
                granted.push(perm);
            }
        }
    }
    granted
}

fn permissions_for_role(role: &Role) -> Vec<Permission> {
    match role.as_str() {
        "admin" => vec![Permission::WILDCARD],
        "manager" => vec![
            Permission::LEDGER_READ,
            Permission::LEDGER_WRITE,
            Permission::LEDGER_VERIFY,
        ],
        "accountant" => vec![Permission::LEDGER_READ, Permission::LEDGER_WRITE],
        "auditor" => vec![Permission::LEDGER_READ, Permission::LEDGER_VERIFY],
        "viewer" => vec![Permission::LEDGER_READ],
        _ => Vec::new(),
    }
}
