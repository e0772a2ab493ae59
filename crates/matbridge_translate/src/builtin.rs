// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in schema tables: Arnold as a source, RenderMan as a destination.

use crate::schema::{DestinationNodeSchema, DestinationSchema, SourceNodeSchema, SourceSchema};
use crate::transform::Transform;

/// Name of the built-in Arnold source schema
pub const ARNOLD: &str = "arnold";

/// Name of the built-in RenderMan destination schema
pub const RENDERMAN: &str = "renderman";

/// Attributes every node type carries
const NODE_STATE: &[&str] = &["caching", "frozen", "isHistoricallyInteresting", "nodeState"];

/// Common double-sided flags of every PxrSurface lobe
const DOUBLE_SIDED: &[&str] = &[
    "diffuseDoubleSided",
    "specularDoubleSided",
    "roughSpecularDoubleSided",
    "clearcoatDoubleSided",
    "fuzzDoubleSided",
    "subsurfaceDoubleSided",
];

fn with_node_state(node: SourceNodeSchema) -> SourceNodeSchema {
    NODE_STATE.iter().fold(node, |node, name| node.same(name))
}

/// Copy a compound attribute and its three children
fn compound(
    node: SourceNodeSchema,
    native: &str,
    common: &str,
    children: [&str; 3],
) -> SourceNodeSchema {
    children.iter().fold(node.copy(native, common), |node, c| {
        node.copy(&format!("{native}{c}"), &format!("{common}{c}"))
    })
}

fn color(node: SourceNodeSchema, native: &str, common: &str) -> SourceNodeSchema {
    compound(node, native, common, ["R", "G", "B"])
}

fn vector(node: SourceNodeSchema, native: &str, common: &str) -> SourceNodeSchema {
    compound(node, native, common, ["X", "Y", "Z"])
}

fn standard_surface() -> SourceNodeSchema {
    let mut node = with_node_state(SourceNodeSchema::new("surfaceShader"));

    // Diffuse
    node = node.copy("base", "diffuseGain");
    node = color(node, "baseColor", "diffuseColor");
    node = node.same("diffuseRoughness");

    let mut thin_walled: Vec<&str> = DOUBLE_SIDED.to_vec();
    thin_walled.extend(["diffuseBackUseDiffuseColor", "thinGlass"]);
    node = node.fan_out("thinWalled", &thin_walled);

    // Specular, feeding both the primary and the rough lobe
    node = node.copy("specular", "specularGain");
    node = color(node, "specularColor", "specularEdgeColor");
    node = color(node, "specularColor", "roughSpecularEdgeColor");
    node = node.fan_out("specularIOR", &["specularIor", "roughSpecularIor"]);
    node = node.same("specularRoughness");
    node = node.transform(
        "specularRoughness",
        "roughSpecularRoughness",
        Transform::OffsetBelow {
            offset: 0.1,
            limit: 1.0,
        },
    );
    node = node.fan_out(
        "specularAnisotropy",
        &["specularAnisotropy", "roughSpecularAnisotropy"],
    );
    node = node.fan_out(
        "specularRotation",
        &[
            "specularAnisotropyDirection",
            "roughSpecularAnisotropyDirection",
        ],
    );
    for axis in ["X", "Y", "Z"] {
        let lobes: Vec<String> = ["specular", "roughSpecular", "clearcoat", "glass"]
            .iter()
            .map(|lobe| format!("{lobe}AnisotropyDirection{axis}"))
            .collect();
        let lobes: Vec<&str> = lobes.iter().map(String::as_str).collect();
        node = node.fan_out(&format!("tangent{axis}"), &lobes);
    }
    node = node.copy("tangent", "glassAnisotropyDirection");

    // Coat
    node = node.copy("coat", "coatGain");
    node = color(node, "coatColor", "clearcoatEdgeColor");
    node = node.copy("coatIOR", "clearcoatIor");
    node = node.copy("coatAffectColor", "clearcoatThickness");
    node = node.copy("coatRoughness", "clearcoatRoughness");
    node = node.copy("coatAnisotropy", "clearcoatAnisotropy");
    node = node.copy("coatRotation", "clearcoatAnisotropyDirection");
    node = vector(node, "coatNormal", "clearcoatBumpNormal");
    node = node.same("coatAffectRoughness");

    // Sheen
    node = node.same("sheen");
    node = color(node, "sheenColor", "sheenColor");
    node = node.same("sheenRoughness");

    // Subsurface
    node = node.copy("subsurface", "subsurfaceGain");
    node = color(node, "subsurfaceColor", "subsurfaceColor");
    node = node.same("subsurfaceScale");
    node = color(node, "subsurfaceRadius", "subsurfaceRadius");
    node = node.copy("subsurfaceAnisotropy", "subsurfaceDirectionality");

    // Transmission
    node = node.fan_out("transmission", &["refractionGain", "reflectionGain"]);
    node = color(node, "transmissionColor", "refractionColor");
    node = node.copy("transmissionExtraRoughness", "glassRoughness");
    node = node.copy("transmissionScatterAnisotropy", "glassAnisotropy");
    node = color(node, "transmissionScatter", "ssAlbedo");
    node = node.transform("transmissionScatter", "extinction", Transform::OneMinus);
    for c in ["R", "G", "B"] {
        node = node.transform(
            &format!("transmissionScatter{c}"),
            &format!("extinction{c}"),
            Transform::OneMinus,
        );
    }

    // Emission, geometry, matte
    node = node.same("emission");
    node = color(node, "emissionColor", "emissionColor");
    node = vector(node, "normalCamera", "bumpNormal");
    node = color(node, "opacity", "opacity");
    node = node.copy("aiEnableMatte", "userColorEnable");
    node = color(node, "aiMatteColor", "userColor");
    node = node.copy("aiMatteColorA", "userColorA");

    // Outputs
    node = color(node, "outColor", "outColor");
    node = node.same("outAlpha");
    node = color(node, "outTransparency", "outTransparency");

    // Arnold-only settings without a RenderMan counterpart
    [
        "caustics",
        "transmissionDispersion",
        "transmitAovs",
        "transmissionDepth",
        "thinFilmThickness",
        "thinFilmIOR",
        "internalReflections",
        "exitToBackground",
        "dielectricPriority",
        "indirectDiffuse",
        "indirectSpecular",
    ]
    .iter()
    .fold(node, |node, name| node.same(name))
}

fn file_texture() -> SourceNodeSchema {
    let node = with_node_state(SourceNodeSchema::new("textureFileNode"))
        .copy("fileTextureName", "filename")
        .same("outAlpha");
    color(node, "outColor", "outColor")
}

/// Arnold (MtoA) to common tables
pub fn arnold() -> SourceSchema {
    SourceSchema::new(ARNOLD)
        .with_node("aiStandardSurface", standard_surface())
        .with_node("file", file_texture())
}

/// Map a common color or vector attribute and its three children
fn rename_compound(
    node: DestinationNodeSchema,
    common: &str,
    native: &str,
    children: [&str; 3],
) -> DestinationNodeSchema {
    children.iter().fold(node.rename(common, native), |node, c| {
        node.rename(&format!("{common}{c}"), &format!("{native}{c}"))
    })
}

fn rename_color(node: DestinationNodeSchema, common: &str, native: &str) -> DestinationNodeSchema {
    rename_compound(node, common, native, ["R", "G", "B"])
}

fn rename_vector(node: DestinationNodeSchema, common: &str, native: &str) -> DestinationNodeSchema {
    rename_compound(node, common, native, ["X", "Y", "Z"])
}

fn pxr_surface() -> DestinationNodeSchema {
    let mut node = DestinationNodeSchema::new("PxrSurface")
        .same(NODE_STATE)
        .same(DOUBLE_SIDED)
        .same(&[
            "inputMaterial",
            "diffuseGain",
            "diffuseRoughness",
            "diffuseExponent",
            "diffuseBackUseDiffuseColor",
            "diffuseTransmitGain",
            "specularFresnelMode",
            "specularRoughness",
            "specularAnisotropy",
            "specularAnisotropyDirection",
            "roughSpecularIor",
            "roughSpecularRoughness",
            "roughSpecularAnisotropy",
            "roughSpecularAnisotropyDirection",
            "clearcoatIor",
            "clearcoatThickness",
            "clearcoatRoughness",
            "clearcoatAnisotropy",
            "clearcoatAnisotropyDirection",
            "subsurfaceGain",
            "subsurfaceDirectionality",
            "subsurfaceIor",
            "refractionGain",
            "reflectionGain",
            "glassRoughness",
            "glassAnisotropy",
            "glassAnisotropyDirection",
            "glassIor",
            "thinGlass",
            "outAlpha",
            "utilityPattern",
        ])
        .rename("specularIor", "specularIor")
        .rename("sheen", "fuzzGain")
        .rename("sheenRoughness", "fuzzConeAngle")
        .rename("subsurfaceScale", "subsurfaceDmfp")
        .rename("emission", "glowGain")
        .rename("opacity", "presence");

    for color in [
        "diffuseColor",
        "diffuseBackColor",
        "diffuseTransmitColor",
        "specularFaceColor",
        "specularEdgeColor",
        "roughSpecularFaceColor",
        "roughSpecularEdgeColor",
        "clearcoatFaceColor",
        "clearcoatEdgeColor",
        "subsurfaceColor",
        "refractionColor",
        "ssAlbedo",
        "extinction",
        "userColor",
        "outColor",
        "outTransparency",
    ] {
        node = rename_color(node, color, color);
    }
    node = rename_color(node, "sheenColor", "fuzzColor");
    node = rename_color(node, "subsurfaceRadius", "subsurfaceDmfpColor");
    node = rename_color(node, "emissionColor", "glowColor");

    for lobe in ["specular", "roughSpecular", "clearcoat", "glass"] {
        let direction = format!("{lobe}AnisotropyDirection");
        node = rename_vector(node, &direction, &direction);
    }
    for normal in ["bumpNormal", "diffuseBumpNormal", "clearcoatBumpNormal"] {
        node = rename_vector(node, normal, normal);
    }
    node
}

fn pxr_texture() -> DestinationNodeSchema {
    let node = DestinationNodeSchema::new("PxrTexture")
        .same(NODE_STATE)
        .same(&["filename"])
        .rename("outAlpha", "resultA");
    rename_color(node, "outColor", "resultRGB")
}

/// Common to RenderMan (RfM) tables
pub fn renderman() -> DestinationSchema {
    DestinationSchema::new(RENDERMAN)
        .with_node("surfaceShader", pxr_surface())
        .with_node("textureFileNode", pxr_texture())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    #[test]
    fn test_thin_walled_fans_out() {
        let source = arnold();
        let surface = &source.nodes["aiStandardSurface"];
        let commons: Vec<_> = surface
            .entries("thinWalled")
            .iter()
            .map(|e| e.common.as_str())
            .collect();
        assert_eq!(commons.len(), DOUBLE_SIDED.len() + 2);
        assert!(commons.contains(&"thinGlass"));
        assert!(commons.contains(&"diffuseBackUseDiffuseColor"));
    }

    #[test]
    fn test_specular_roughness_offset() {
        let registry = SchemaRegistry::builtin();
        let pair = registry.pair(ARNOLD, RENDERMAN).unwrap();
        let entries = pair.map_from_source("aiStandardSurface", "specularRoughness");
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].has_transform());
        assert!(entries[1].has_transform());
    }

    #[test]
    fn test_every_common_name_resolves_or_is_arnold_only() {
        let registry = SchemaRegistry::builtin();
        let pair = registry.pair(ARNOLD, RENDERMAN).unwrap();
        let surface = pair.source_node("aiStandardSurface").unwrap();

        let unresolved: Vec<_> = surface
            .fields
            .values()
            .flatten()
            .filter(|e| pair.map_to_destination("surfaceShader", &e.common).is_none())
            .map(|e| e.common.as_str())
            .collect();
        assert!(unresolved.contains(&"caustics"));
        assert!(unresolved.contains(&"coatGain"));
        assert!(!unresolved.contains(&"diffuseColor"));
        assert!(!unresolved.contains(&"extinctionR"));
    }

    #[test]
    fn test_native_types() {
        let registry = SchemaRegistry::builtin();
        let pair = registry.pair(ARNOLD, RENDERMAN).unwrap();
        assert_eq!(pair.destination_type_name("file"), Some("textureFileNode"));
        assert_eq!(pair.native_type("textureFileNode"), Some("PxrTexture"));
        assert_eq!(pair.native_type("surfaceShader"), Some("PxrSurface"));
    }
}
