//! WGSL front end: parse, validate and reflect a single-stage shader module.
//!
//! Reflection gives the GL-style program model its names: vertex inputs by
//! `@location`, resource globals by `@group/@binding`.

use std::collections::BTreeMap;

use cubeview_render::ShaderStage;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceKind {
    /// Uniform buffer of `size` bytes.
    Uniform { size: u32 },
    /// Filterable float 2D texture.
    Texture,
    /// Filtering sampler.
    Sampler,
}

/// A user-defined `@location` on a stage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageVarying {
    pub name: String,
    pub location: u32,
}

/// A named resource global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShaderResource {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    #[serde(flatten)]
    pub kind: ResourceKind,
}

/// Everything the backend needs to know about one compiled stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShaderInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub inputs: Vec<StageVarying>,
    pub outputs: Vec<StageVarying>,
    pub resources: Vec<ShaderResource>,
}

impl ShaderInterface {
    pub fn input(&self, name: &str) -> Option<u32> {
        self.inputs
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.location)
    }

    pub fn resource(&self, name: &str) -> Option<&ShaderResource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// One binding slot after merging both stages of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBinding {
    pub name: String,
    pub binding: u32,
    pub kind: ResourceKind,
    pub vertex: bool,
    pub fragment: bool,
}

/// Parse and validate `source`, then reflect the entry point for `stage`.
///
/// Errors are rendered diagnostics suitable for an info log.
pub fn reflect_source(stage: ShaderStage, source: &str) -> Result<ShaderInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;
    reflect_module(&module, stage)
}

pub fn reflect_module(
    module: &naga::Module,
    stage: ShaderStage,
) -> Result<ShaderInterface, String> {
    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let mut entries = module.entry_points.iter().filter(|ep| ep.stage == wanted);
    let entry = entries
        .next()
        .ok_or_else(|| format!("no {stage} entry point"))?;
    if entries.next().is_some() {
        return Err(format!("more than one {stage} entry point"));
    }

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        let name = arg.name.clone().unwrap_or_default();
        collect_varyings(module, arg.ty, arg.binding.as_ref(), name, &mut inputs);
    }
    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_varyings(
            module,
            result.ty,
            result.binding.as_ref(),
            String::new(),
            &mut outputs,
        );
    }
    inputs.sort_by_key(|v| v.location);
    outputs.sort_by_key(|v| v.location);

    let mut resources = Vec::new();
    for (_, global) in module.global_variables.iter() {
        let Some(rb) = &global.binding else {
            continue;
        };
        let name = global.name.clone().ok_or_else(|| {
            format!(
                "unnamed resource at @group({}) @binding({})",
                rb.group, rb.binding
            )
        })?;
        let inner = &module.types[global.ty].inner;
        let kind = match (global.space, inner) {
            (naga::AddressSpace::Uniform, _) => ResourceKind::Uniform {
                size: inner.size(module.to_ctx()),
            },
            (
                naga::AddressSpace::Handle,
                naga::TypeInner::Image {
                    dim: naga::ImageDimension::D2,
                    arrayed: false,
                    class:
                        naga::ImageClass::Sampled {
                            kind: naga::ScalarKind::Float,
                            multi: false,
                        },
                },
            ) => ResourceKind::Texture,
            (naga::AddressSpace::Handle, naga::TypeInner::Sampler { comparison: false }) => {
                ResourceKind::Sampler
            }
            _ => return Err(format!("resource '{name}' has an unsupported type")),
        };
        resources.push(ShaderResource {
            name,
            group: rb.group,
            binding: rb.binding,
            kind,
        });
    }
    resources.sort_by_key(|r| (r.group, r.binding));

    Ok(ShaderInterface {
        stage,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        resources,
    })
}

/// Location-bound values, either directly or through struct members.
fn collect_varyings(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    name: String,
    out: &mut Vec<StageVarying>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(StageVarying {
            name,
            location: *location,
        }),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.push(StageVarying {
                            name: member.name.clone().unwrap_or_default(),
                            location: *location,
                        });
                    }
                }
            }
        }
    }
}

/// Every fragment input must be written by the vertex stage at the same location.
pub fn check_stage_link(
    vertex: &ShaderInterface,
    fragment: &ShaderInterface,
) -> Result<(), String> {
    for input in &fragment.inputs {
        if !vertex.outputs.iter().any(|o| o.location == input.location) {
            return Err(format!(
                "fragment input '{}' at location {} is not written by the vertex stage",
                input.name, input.location
            ));
        }
    }
    Ok(())
}

/// Merge the resources of both stages into per-group binding lists.
///
/// A slot declared by both stages must agree on kind.
pub fn merge_resources(
    vertex: &ShaderInterface,
    fragment: &ShaderInterface,
) -> Result<BTreeMap<u32, Vec<MergedBinding>>, String> {
    let mut slots: BTreeMap<(u32, u32), MergedBinding> = BTreeMap::new();
    for iface in [vertex, fragment] {
        for res in &iface.resources {
            let slot = slots
                .entry((res.group, res.binding))
                .or_insert_with(|| MergedBinding {
                    name: res.name.clone(),
                    binding: res.binding,
                    kind: res.kind,
                    vertex: false,
                    fragment: false,
                });
            if slot.kind != res.kind {
                return Err(format!(
                    "@group({}) @binding({}) is '{}' in one stage and '{}' in another",
                    res.group, res.binding, slot.name, res.name
                ));
            }
            match iface.stage {
                ShaderStage::Vertex => slot.vertex = true,
                ShaderStage::Fragment => slot.fragment = true,
            }
        }
    }

    let mut groups: BTreeMap<u32, Vec<MergedBinding>> = BTreeMap::new();
    for ((group, _), slot) in slots {
        groups.entry(group).or_default().push(slot);
    }
    Ok(groups)
}
