/// One entry of the sidebar. Entries without an `href` are placeholders
/// or pure group headers.
#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub id: String,
    pub label: String,
    pub href: String,
    pub icon: String,
    pub is_active: bool,
    pub opened: bool,
    pub children: Vec<NavLink>,
}

impl NavLink {
    fn leaf(label: &str, href: &str) -> Self {
        NavLink {
            id: nav_id(label),
            label: label.to_string(),
            href: href.to_string(),
            icon: String::new(),
            is_active: false,
            opened: false,
            children: vec![],
        }
    }

    fn group(label: &str, icon: &str, children: Vec<NavLink>) -> Self {
        NavLink {
            id: nav_id(label),
            label: label.to_string(),
            href: String::new(),
            icon: icon.to_string(),
            is_active: false,
            opened: false,
            children,
        }
    }

    fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

fn nav_id(label: &str) -> String {
    let slug: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("navlink-{slug}")
}

/// Company types that get the commercial menu.
pub fn is_commercial(company_type: &str) -> bool {
    company_type.trim().eq_ignore_ascii_case("comercial")
}

fn placeholders() -> Vec<NavLink> {
    vec![
        NavLink::leaf("First child link", ""),
        NavLink::leaf("Second child link", ""),
        NavLink::leaf("Third child link", ""),
    ]
}

/// Build the sidebar for a company type and mark the link matching `current_path`.
pub fn build_navbar(company_type: &str, current_path: &str) -> Vec<NavLink> {
    let mut links = if is_commercial(company_type) {
        vec![
            NavLink::leaf("Home", "/").with_icon("tabler:home"),
            NavLink::group(
                "Costos",
                "tabler:gauge",
                vec![
                    NavLink::leaf("Pruebas", "/dashboard"),
                    NavLink::leaf("Costos Diarios", "/costos-diarios"),
                ],
            ),
            NavLink::group("Dashboard2", "tabler:fingerprint", placeholders()),
        ]
    } else {
        let mut nested = NavLink::group("Nested parent link", "", placeholders());
        nested.id = "navlink-nested-parent".to_string();
        vec![NavLink::group(
            "Never",
            "tabler:gauge",
            vec![
                NavLink::leaf("First child link", ""),
                NavLink::leaf("Second child link", ""),
                nested,
            ],
        )]
    };

    for link in &mut links {
        mark_active(link, current_path);
    }
    links
}

/// Exact-match activation. Returns true if this link or a descendant is active;
/// parents of an active link are opened.
fn mark_active(link: &mut NavLink, current_path: &str) -> bool {
    let mut child_active = false;
    for child in &mut link.children {
        child_active |= mark_active(child, current_path);
    }
    link.is_active = !link.href.is_empty() && link.href == current_path;
    link.opened = child_active;
    link.is_active || child_active
}
