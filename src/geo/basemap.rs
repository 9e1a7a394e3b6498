//! Basemap tile sources and the exclusive basemap selection.

use super::TileId;
use crate::config::BasemapConfig;

/// Subdomains substituted for `{s}` in URL templates.
const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// A named XYZ raster tile source.
#[derive(Debug, Clone, PartialEq)]
pub struct Basemap {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Basemap {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        attribution: impl Into<String>,
        max_zoom: u8,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            attribution: attribution.into(),
            max_zoom,
        }
    }

    pub fn from_config(config: &BasemapConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.url.clone(),
            config.attribution.clone(),
            config.max_zoom,
        )
    }

    /// Expands the URL template for a tile.
    pub fn tile_url(&self, tile: TileId) -> String {
        let index = (tile.x as u64 + tile.y as u64) % SUBDOMAINS.len() as u64;
        let subdomain = SUBDOMAINS[index as usize];

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{r}", "")
    }
}

/// One entry of the layer switcher's option list.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOption {
    pub index: usize,
    pub name: String,
    pub selected: bool,
}

/// The ordered set of basemaps with exactly one active entry.
#[derive(Debug, Clone)]
pub struct BasemapSet {
    layers: Vec<Basemap>,
    active: usize,
}

impl BasemapSet {
    /// Creates the set with the first basemap active.
    ///
    /// Returns None for an empty list since a set without an active
    /// basemap cannot exist.
    pub fn new(layers: Vec<Basemap>) -> Option<Self> {
        if layers.is_empty() {
            return None;
        }
        Some(Self { layers, active: 0 })
    }

    pub fn from_config(configs: &[BasemapConfig]) -> Option<Self> {
        Self::new(configs.iter().map(Basemap::from_config).collect())
    }

    pub fn active(&self) -> &Basemap {
        &self.layers[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Activates the basemap at `index`, deactivating the previous one.
    ///
    /// Returns false (and keeps the current selection) if `index` is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.layers.len() {
            return false;
        }
        if index != self.active {
            log::info!(
                "Switching basemap: {} -> {}",
                self.layers[self.active].name,
                self.layers[index].name
            );
        }
        self.active = index;
        true
    }

    /// The selection rendered by the panel's layers section.
    pub fn options(&self) -> Vec<LayerOption> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, basemap)| LayerOption {
                index,
                name: basemap.name.clone(),
                selected: index == self.active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BasemapSet {
        BasemapSet::new(vec![
            Basemap::new("OSM", "https://{s}.tile.osm.org/{z}/{x}/{y}.png", "© OSM", 19),
            Basemap::new("Topo", "https://topo.example/{z}/{y}/{x}{r}.jpg", "Topo", 17),
            Basemap::new("Dark", "https://dark.example/{z}/{x}/{y}.png", "Dark", 20),
        ])
        .unwrap()
    }

    #[test]
    fn test_tile_url_expansion() {
        let mut set = sample();
        let tile = TileId::new(5, 16, 11);

        assert_eq!(
            set.active().tile_url(tile),
            "https://a.tile.osm.org/5/16/11.png"
        );

        set.select(1);
        let topo = set.active();
        assert_eq!(topo.tile_url(tile), "https://topo.example/5/11/16.jpg");
    }

    #[test]
    fn test_first_basemap_active_initially() {
        let set = sample();
        assert_eq!(set.active_index(), 0);
        assert_eq!(set.active().name, "OSM");

        let selected: Vec<_> = set.options().into_iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "OSM");
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut set = sample();
        for index in [2, 1, 1, 0, 2] {
            assert!(set.select(index));
            let options = set.options();
            assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
            assert!(options[index].selected);
        }
    }

    #[test]
    fn test_invalid_selection_keeps_current() {
        let mut set = sample();
        set.select(1);
        assert!(!set.select(7));
        assert_eq!(set.active().name, "Topo");
        assert_eq!(set.active_index(), 1);
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(BasemapSet::new(Vec::new()).is_none());
    }
}
