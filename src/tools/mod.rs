//! Map tools attached around the map canvas.

pub mod import;
pub mod locate;
pub mod minimap;
pub mod scale;

/// Tool name enabling the local-file GeoJSON import.
pub const GEOJSON_UPLOAD: &str = "geojson_upload";
/// Tool name enabling the URL GeoJSON import.
pub const GEOJSON_URL: &str = "geojson_url";

/// Which optional tools the configuration enabled.
///
/// Locate, minimap and scale are always present; only the import paths are
/// gated by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolSet {
    pub geojson_file: bool,
    pub geojson_url: bool,
}

impl ToolSet {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut tools = Self::default();
        for name in names {
            match name.as_ref() {
                GEOJSON_UPLOAD => tools.geojson_file = true,
                GEOJSON_URL => tools.geojson_url = true,
                other => log::warn!("Ignoring unknown tool '{}'", other),
            }
        }
        tools
    }

    /// True if any GeoJSON import path is enabled.
    pub fn has_import(&self) -> bool {
        self.geojson_file || self.geojson_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_gating() {
        let tools = ToolSet::from_names(&["geojson_upload", "measure"]);
        assert!(tools.geojson_file);
        assert!(!tools.geojson_url);
        assert!(tools.has_import());

        let none = ToolSet::from_names::<&str>(&[]);
        assert!(!none.has_import());

        let both = ToolSet::from_names(&[GEOJSON_URL.to_string(), GEOJSON_UPLOAD.to_string()]);
        assert_eq!(
            both,
            ToolSet {
                geojson_file: true,
                geojson_url: true
            }
        );
    }
}
