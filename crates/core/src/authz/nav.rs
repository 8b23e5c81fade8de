use serde::Serialize;

use crate::domain::user::Role;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
}

const DASHBOARD: NavItem = NavItem { title: "Dashboard", path: "/dashboard", icon: "dashboard" };
const INVOICES: NavItem = NavItem { title: "Invoices", path: "/invoices", icon: "list" };
const REPORTS: NavItem = NavItem { title: "Reports", path: "/reports", icon: "assessment" };

/// Navigation menu entries for a role. Admin and manager see the reports
/// section; biller and collector work their invoice queues only.
pub fn navigation_for(role: Role) -> &'static [NavItem] {
    match role {
        Role::Admin | Role::Manager => &[DASHBOARD, INVOICES, REPORTS],
        Role::Biller | Role::Collector => &[DASHBOARD, INVOICES],
    }
}
