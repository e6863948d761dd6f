//! Demo tenants and users, created through the blocking façade.

use crate::accounts::RegisterRequest;
use crate::accounts::blocking::BlockingAccounts;
use crate::models::NewCompany;

struct DemoUser {
    username: &'static str,
    password: &'static str,
    email: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    position: &'static str,
    department: &'static str,
    company: &'static str,
    is_admin: bool,
}

pub const ADMIN_USERNAME: &str = "admin_user";
const ADMIN_PASSWORD: &str = "admin123";

fn demo_companies() -> Vec<NewCompany> {
    vec![
        NewCompany {
            name: "Tech Solutions Inc.".into(),
            description: Some("Empresa de soluciones tecnológicas".into()),
            email: Some("contact@techsolutions.com".into()),
            phone: Some("+1-555-0123".into()),
            address: Some("123 Tech Street, Silicon Valley, CA".into()),
            website: Some("https://techsolutions.com".into()),
        },
        NewCompany {
            name: "DataCorp Analytics".into(),
            description: Some("Análisis de datos y business intelligence".into()),
            email: Some("info@datacorp.com".into()),
            phone: Some("+1-555-0456".into()),
            address: Some("456 Data Avenue, New York, NY".into()),
            website: Some("https://datacorp.com".into()),
        },
    ]
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        username: ADMIN_USERNAME,
        password: ADMIN_PASSWORD,
        email: "admin@techsolutions.com",
        first_name: "Juan",
        last_name: "Pérez",
        position: "Administrador",
        department: "IT",
        company: "Tech Solutions Inc.",
        is_admin: true,
    },
    DemoUser {
        username: "data_analyst",
        password: "analyst456",
        email: "analyst@datacorp.com",
        first_name: "María",
        last_name: "García",
        position: "Analista de Datos",
        department: "Analytics",
        company: "DataCorp Analytics",
        is_admin: false,
    },
    DemoUser {
        username: "developer",
        password: "dev789",
        email: "dev@techsolutions.com",
        first_name: "Carlos",
        last_name: "López",
        position: "Desarrollador",
        department: "IT",
        company: "Tech Solutions Inc.",
        is_admin: false,
    },
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub companies_created: usize,
    pub users_created: usize,
    pub admin_authenticated: bool,
}

/// Create the demo data. Existing rows are skipped with a warning, so the
/// command can run repeatedly.
pub fn run(accounts: &BlockingAccounts<'_>) -> SeedSummary {
    let mut summary = SeedSummary::default();

    for company in demo_companies() {
        if accounts.find_company_by_name(&company.name).is_some() {
            log::warn!("Company '{}' already exists, skipping", company.name);
            continue;
        }
        if accounts.create_company(&company).is_some() {
            summary.companies_created += 1;
        }
    }

    for demo in DEMO_USERS {
        if accounts.get_user_by_username(demo.username).is_some() {
            log::warn!("User '{}' already exists, skipping", demo.username);
            continue;
        }
        let Some(company) = accounts.find_company_by_name(demo.company) else {
            log::error!("Company '{}' missing, cannot create '{}'", demo.company, demo.username);
            continue;
        };
        let req = RegisterRequest {
            username: demo.username.into(),
            password: demo.password.into(),
            first_name: demo.first_name.into(),
            last_name: demo.last_name.into(),
            email: demo.email.into(),
            phone: None,
            position: Some(demo.position.into()),
            department: Some(demo.department.into()),
            company_id: company.id,
            is_admin: demo.is_admin,
        };
        if accounts.create_user(&req) {
            summary.users_created += 1;
        }
    }

    match accounts.authenticate_user(ADMIN_USERNAME, ADMIN_PASSWORD) {
        Some(payload) => {
            summary.admin_authenticated = true;
            let companies = accounts.get_user_companies(payload.user_id);
            log::info!(
                "Admin '{}' authenticated; companies: {:?}",
                payload.full_name,
                companies.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
            );
        }
        None => log::warn!("Admin login failed after seeding"),
    }

    log::info!(
        "Seed complete: {} companies, {} users created",
        summary.companies_created,
        summary.users_created
    );
    summary
}
