//! Loading pipeline: finds data files, deserializes them, resolves names and
//! builds the catalog and configuration presets.
//!
//! Format detection (RON/JSON/TOML) and file discovery follow the same rules
//! for every file: one base name, one of three extensions, never two at once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use oreplan_core::catalog::{Catalog, CatalogBuilder, EmitterSpec, NodeSpec, UnitSpec};
use oreplan_core::config::{Configuration, ModuleRequest};
use oreplan_core::fixed::f64_to_fixed64;
use oreplan_core::id::{EntityTypeId, QualityId};
use serde::de::DeserializeOwned;

use crate::schema::{CatalogData, PresetData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file from its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// Returns `Ok(None)` if none exists and `ConflictingFormats` if more than
/// one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its format.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. TOML has no top-level arrays, so there the list is
/// read from the array at `toml_key`; RON and JSON hold the list directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array.try_into().map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name, returning `UnresolvedRef` if it is unknown.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Fail with `DuplicateName` if `name` is already taken.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Everything loaded from a data directory.
#[derive(Debug, Clone)]
pub struct PlannerData {
    pub catalog: Catalog,
    /// Presets by name.
    pub presets: HashMap<String, Configuration>,
}

/// Load `catalog` (required) and `presets` (optional) from `dir`.
pub fn load_planner_data(dir: &Path) -> Result<PlannerData, DataLoadError> {
    let catalog_path = require_data_file(dir, "catalog")?;
    let data: CatalogData = deserialize_file(&catalog_path)?;
    let (catalog, names) = build_catalog(&data, &catalog_path)?;

    let mut presets = HashMap::new();
    if let Some(path) = find_data_file(dir, "presets")? {
        let list: Vec<PresetData> = deserialize_list(&path, "presets")?;
        for preset in &list {
            check_duplicate(&presets, &preset.name, &path)?;
            let config = resolve_preset(preset, &names, &path)?;
            presets.insert(preset.name.clone(), config);
        }
    }

    log::debug!(
        "loaded {} entities and {} presets from {}",
        catalog.len(),
        presets.len(),
        dir.display()
    );
    Ok(PlannerData { catalog, presets })
}

/// Register every entity of `data`, rejecting repeated names across kinds.
pub fn build_catalog(
    data: &CatalogData,
    file: &Path,
) -> Result<(Catalog, HashMap<String, EntityTypeId>), DataLoadError> {
    let mut builder = CatalogBuilder::new();
    let mut names: HashMap<String, EntityTypeId> = HashMap::new();
    let mut claim = |name: &str, id: EntityTypeId| -> Result<(), DataLoadError> {
        check_duplicate(&names, name, file)?;
        names.insert(name.to_string(), id);
        Ok(())
    };

    for unit in &data.units {
        let id = builder.register_unit(
            &unit.name,
            UnitSpec {
                width: unit.width,
                height: unit.height,
                reach: unit.reach.unwrap_or(unit.width.max(unit.height)),
                fluid_input: unit.fluid_input,
                module_slots: unit.module_slots,
            },
        );
        claim(&unit.name, id)?;
    }
    for line in &data.transport_lines {
        let id = builder.register_transport_line(&line.name, &line.bridge, line.max_bridge_span);
        claim(&line.name, id)?;
        claim(&line.bridge, EntityTypeId(id.0 + 1))?;
    }
    for node in &data.power_nodes {
        let id = builder.register_node(
            &node.name,
            NodeSpec {
                coverage_radius: f64_to_fixed64(node.coverage_radius),
                link_reach: f64_to_fixed64(node.link_reach),
            },
        );
        claim(&node.name, id)?;
    }
    for emitter in &data.emitters {
        let id = builder.register_emitter(
            &emitter.name,
            EmitterSpec {
                size: emitter.size,
                effect_radius: emitter.effect_radius,
                module_slots: emitter.module_slots,
            },
        );
        claim(&emitter.name, id)?;
    }
    for fluid in &data.fluid_segments {
        let id = builder.register_fluid_segment(&fluid.name);
        claim(&fluid.name, id)?;
    }
    for module in &data.modules {
        let id = builder.register_module(&module.name);
        claim(&module.name, id)?;
    }

    Ok((builder.build(), names))
}

/// Turn a preset into a [`Configuration`]. Kinds are not checked here;
/// [`Configuration::resolve`] does that at planning time.
fn resolve_preset(
    preset: &PresetData,
    names: &HashMap<String, EntityTypeId>,
    file: &Path,
) -> Result<Configuration, DataLoadError> {
    let id = |name: &str, kind: &'static str| resolve_name(names, name, file, kind).copied();
    let optional = |name: &Option<String>, kind: &'static str| -> Result<_, DataLoadError> {
        name.as_deref().map(|n| id(n, kind)).transpose()
    };
    let modules = |list: &[(String, u8)]| -> Result<Vec<ModuleRequest>, DataLoadError> {
        list.iter()
            .map(|(name, count)| -> Result<ModuleRequest, DataLoadError> {
                Ok(ModuleRequest {
                    module: id(name, "module")?,
                    count: *count,
                })
            })
            .collect()
    };

    let mut config = Configuration::new(
        id(&preset.unit, "unit")?,
        id(&preset.segment, "transport segment")?,
        id(&preset.node, "power node")?,
    );
    config.strategy = preset.strategy;
    config.flow_direction = preset.flow;
    config.emitter_type = optional(&preset.emitter, "emitter")?;
    config.fluid_segment_type = optional(&preset.fluid_segment, "fluid segment")?;
    config.max_emitters_per_unit = preset.max_emitters_per_unit;
    config.preferred_emitters_per_unit = preset.preferred_emitters_per_unit;
    config.non_destructive = preset.non_destructive;
    config.modules = modules(&preset.modules)?;
    config.emitter_modules = modules(&preset.emitter_modules)?;
    config.quality = preset.quality.map(QualityId);
    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================
