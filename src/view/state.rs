// src/view/state.rs

use crate::domain::Property;
use crate::view::filters::{filter_properties, ActiveFilters};
use serde::Serialize;

/// Viewport widths at or above this start with the results sidebar open.
pub const SIDEBAR_BREAKPOINT_PX: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailTab {
    #[default]
    Overview,
    Financials,
    Intelligence,
    Neighborhood,
    Comparables,
}

impl DetailTab {
    pub const ALL: [DetailTab; 5] = [
        DetailTab::Overview,
        DetailTab::Financials,
        DetailTab::Intelligence,
        DetailTab::Neighborhood,
        DetailTab::Comparables,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::Financials => "Financials",
            DetailTab::Intelligence => "Intelligence",
            DetailTab::Neighborhood => "Neighborhood",
            DetailTab::Comparables => "Comparables",
        }
    }

    /// Query-string form, as in `/?selected=<id>&tab=financials`.
    pub fn slug(self) -> &'static str {
        match self {
            DetailTab::Overview => "overview",
            DetailTab::Financials => "financials",
            DetailTab::Intelligence => "intelligence",
            DetailTab::Neighborhood => "neighborhood",
            DetailTab::Comparables => "comparables",
        }
    }

    pub fn from_slug(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|tab| tab.slug().eq_ignore_ascii_case(raw))
    }
}

/// Result list, filters, selection and detail tab.
///
/// The canonical list is only ever replaced wholesale; everything shown
/// is derived from it on demand.
#[derive(Debug, Clone)]
pub struct PropertyViewState {
    properties: Vec<Property>,
    filters: ActiveFilters,
    selected_id: Option<String>,
    tab: DetailTab,
    sidebar_open: bool,
}

impl PropertyViewState {
    pub fn new(initial_width: u32) -> Self {
        Self {
            properties: Vec::new(),
            filters: ActiveFilters::default(),
            selected_id: None,
            tab: DetailTab::default(),
            sidebar_open: initial_width >= SIDEBAR_BREAKPOINT_PX,
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Installs a new result set. A selection that is not part of it is dropped.
    pub fn replace_properties(&mut self, properties: Vec<Property>) {
        self.properties = properties;
        if let Some(id) = &self.selected_id {
            if !self.properties.iter().any(|p| &p.id == id) {
                tracing::debug!("Selected property {id} left the result set");
                self.selected_id = None;
                self.tab = DetailTab::default();
            }
        }
    }

    pub fn filters(&self) -> &ActiveFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: ActiveFilters) {
        self.filters = filters;
    }

    pub fn filtered_properties(&self) -> Vec<&Property> {
        filter_properties(&self.properties, &self.filters)
    }

    /// Filtered listings that can be drawn as markers.
    pub fn map_markers(&self) -> Vec<&Property> {
        self.filtered_properties()
            .into_iter()
            .filter(|p| p.is_mappable())
            .collect()
    }

    /// Selects by id. Unknown ids are ignored and return `None`.
    pub fn select(&mut self, id: &str) -> Option<&Property> {
        let Some(index) = self.properties.iter().position(|p| p.id == id) else {
            tracing::debug!("Ignoring selection of unknown property {id}");
            return None;
        };
        if self.selected_id.as_deref() != Some(id) {
            self.tab = DetailTab::default();
        }
        self.selected_id = Some(id.to_string());
        self.properties.get(index)
    }

    pub fn selected(&self) -> Option<&Property> {
        let id = self.selected_id.as_deref()?;
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
        self.tab = DetailTab::default();
    }

    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: DetailTab) {
        self.tab = tab;
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }
}
