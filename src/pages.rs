//! Registry of dashboard pages served inside the shell.
//!
//! A page only describes its dashboard: a heading and the KPI card slots the
//! chart layer fills in. Rendering the charts happens client-side.

use crate::config::PAGE_TITLE_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiCard {
    pub id: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub path: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub cards: &'static [KpiCard],
}

impl Page {
    /// Browser title, e.g. `BI | Costos Diarios`.
    pub fn full_title(&self) -> String {
        format!("{PAGE_TITLE_PREFIX}{}", self.title)
    }
}

pub const PAGES: &[Page] = &[
    Page {
        path: "/",
        title: "Home",
        description: "Resumen general",
        cards: &[],
    },
    Page {
        path: "/dashboard",
        title: "Pruebas",
        description: "Tablero de pruebas",
        cards: &[
            KpiCard { id: "kpi-ventas", title: "Ventas" },
            KpiCard { id: "kpi-costos", title: "Costos" },
        ],
    },
    Page {
        path: "/costos-diarios",
        title: "Costos Diarios",
        description: "Costos diarios por centro de costo",
        cards: &[
            KpiCard { id: "kpi-costo-total", title: "Costo total" },
            KpiCard { id: "kpi-costo-promedio", title: "Costo promedio diario" },
            KpiCard { id: "kpi-variacion", title: "Variación vs. día anterior" },
        ],
    },
];

pub fn find(path: &str) -> Option<&'static Page> {
    PAGES.iter().find(|p| p.path == path)
}
