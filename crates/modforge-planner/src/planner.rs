//! Converts a [`ModIR`] into a [`TaskDAG`] per the seven-phase table:
//! workspace setup, per-element texture generation, code generation,
//! asset materialization, build-file/metadata/mixin generation, Gradle
//! wrapper setup, and the final build — each phase's dependencies
//! expressed as task ids.

use modforge_core::ir::{AssetKind, ModIR};
use modforge_core::task::{Task, TaskDAG};
use serde_json::{json, Map, Value};

const PRIORITY_SETUP: i32 = 100;
const PRIORITY_TEXTURE: i32 = 80;
const PRIORITY_CODE: i32 = 70;
const PRIORITY_ASSETS: i32 = 65;
const PRIORITY_METADATA: i32 = 60;
const PRIORITY_GRADLE: i32 = 50;
const PRIORITY_BUILD: i32 = 10;

const SETUP_WORKSPACE: &str = "setup_workspace";
const GENERATE_CODE: &str = "generate_code";
const GENERATE_ASSETS: &str = "generate_assets";
const GENERATE_BUILD_FILES: &str = "generate_build_files";
const GENERATE_FABRIC_METADATA: &str = "generate_fabric_metadata";
const GENERATE_MIXINS: &str = "generate_mixins";
const SETUP_GRADLE_WRAPPER: &str = "setup_gradle_wrapper";
const BUILD: &str = "build";

/// Produce the task DAG for building `ir`. Deterministic; performs no I/O.
#[must_use]
pub fn plan(ir: &ModIR) -> TaskDAG {
    let mut tasks = Vec::new();

    // Phase 1.
    tasks.push(Task::new(SETUP_WORKSPACE, SETUP_WORKSPACE, vec![], false, PRIORITY_SETUP));

    // Phase 2: one generate_texture task per textured element, parallel.
    let mut texture_task_ids = Vec::new();
    for asset in ir.assets.iter().filter(|a| a.kind == AssetKind::Texture) {
        let element_id = element_id_from_path(&asset.path);
        let task_id = format!("generate_texture_{element_id}");
        let params = texture_params(&element_id, asset);
        tasks.push(
            Task::new(&task_id, "generate_texture", vec![SETUP_WORKSPACE.to_string()], true, PRIORITY_TEXTURE)
                .with_params(params),
        );
        texture_task_ids.push(task_id);
    }

    // Phase 3: single code-generation task.
    tasks.push(Task::new(GENERATE_CODE, GENERATE_CODE, vec![SETUP_WORKSPACE.to_string()], false, PRIORITY_CODE));

    // Phase 4: single asset-materialization task, depends on every texture
    // task plus setup directly — when the IR has no textured elements
    // `texture_task_ids` is empty, and without the explicit setup
    // dependency this task would become a second DAG entry.
    let mut generate_assets_deps = vec![SETUP_WORKSPACE.to_string()];
    for task_id in texture_task_ids {
        if !generate_assets_deps.contains(&task_id) {
            generate_assets_deps.push(task_id);
        }
    }
    tasks.push(Task::new(GENERATE_ASSETS, GENERATE_ASSETS, generate_assets_deps, false, PRIORITY_ASSETS));

    // Phase 5: build files / Fabric metadata / mixins, parallel.
    for kind in [GENERATE_BUILD_FILES, GENERATE_FABRIC_METADATA, GENERATE_MIXINS] {
        tasks.push(Task::new(kind, kind, vec![SETUP_WORKSPACE.to_string()], true, PRIORITY_METADATA));
    }

    // Phase 6: Gradle wrapper setup.
    tasks.push(Task::new(
        SETUP_GRADLE_WRAPPER,
        SETUP_GRADLE_WRAPPER,
        vec![SETUP_WORKSPACE.to_string()],
        false,
        PRIORITY_GRADLE,
    ));

    // Phase 7: the build, depends on everything.
    let build_deps = tasks.iter().map(|t| t.id.clone()).collect();
    tasks.push(Task::new(BUILD, BUILD, build_deps, false, PRIORITY_BUILD));

    TaskDAG::new(tasks)
}

fn element_id_from_path(path: &str) -> String {
    path.rsplit('/')
        .next()
        .and_then(|file_name| file_name.strip_suffix(".png"))
        .unwrap_or(path)
        .to_string()
}

fn texture_params(element_id: &str, asset: &modforge_core::ir::IRAsset) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("element_id".to_string(), json!(element_id));
    params.insert("prompt".to_string(), json!(asset.prompt.clone().unwrap_or_default()));
    params.insert("reference_ids".to_string(), json!(asset.reference_texture_ids.clone()));
    params.insert("output_path".to_string(), json!(asset.path.clone()));
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use modforge_core::config::{Loader, Mapping};
    use modforge_core::ir::{IRItem, IRTool};
    use modforge_core::spec::{CreativeTab, MaterialTier, Rarity, ToolKind};

    fn sample_ir() -> ModIR {
        ModIR {
            mod_id: "examplemod".to_string(),
            base_package: "com.example.examplemod".to_string(),
            main_class: "ExamplemodMod".to_string(),
            mod_version: "1.0.0".to_string(),
            minecraft_version: "1.21.1".to_string(),
            loader: Loader::Fabric,
            mapping: Mapping::Official,
            items: vec![IRItem {
                source_index: 0,
                registry_id: "examplemod:ruby_sword".to_string(),
                java_class_name: "RubySwordItem".to_string(),
                registration_constant: "RUBY_SWORD".to_string(),
                display_name: "Ruby Sword".to_string(),
                rarity: Rarity::Common,
                creative_tab: CreativeTab::Misc,
                max_stack_size: 64,
                fireproof: false,
            }],
            blocks: vec![],
            tools: vec![IRTool {
                source_index: 0,
                registry_id: "examplemod:ruby_pickaxe".to_string(),
                java_class_name: "RubyPickaxePickaxeItem".to_string(),
                registration_constant: "RUBY_PICKAXE".to_string(),
                display_name: "Ruby Pickaxe".to_string(),
                tool_kind: ToolKind::Pickaxe,
                material_tier: MaterialTier::Diamond,
                durability: 1561,
                mining_speed: 8.0,
                attack_damage: 7.0,
                rarity: Rarity::Common,
                creative_tab: CreativeTab::Tools,
            }],
            recipes: vec![],
            assets: vec![
                modforge_core::ir::IRAsset {
                    kind: AssetKind::Texture,
                    path: "assets/examplemod/textures/item/ruby_sword.png".to_string(),
                    payload: None,
                    prompt: Some("Ruby Sword".to_string()),
                    reference_texture_ids: vec![],
                },
                modforge_core::ir::IRAsset {
                    kind: AssetKind::Texture,
                    path: "assets/examplemod/textures/item/ruby_pickaxe.png".to_string(),
                    payload: None,
                    prompt: Some("Ruby Pickaxe".to_string()),
                    reference_texture_ids: vec![],
                },
            ],
            compiled_at: Utc::now(),
            source_spec_version: 1,
        }
    }

    #[test]
    fn dag_has_exactly_one_entry_and_one_terminal() {
        let dag = plan(&sample_ir());
        assert_eq!(dag.entry_tasks().len(), 1);
        assert_eq!(dag.entry_tasks()[0].id, SETUP_WORKSPACE);
        assert_eq!(dag.terminal_tasks().len(), 1);
        assert_eq!(dag.terminal_tasks()[0].id, BUILD);
    }

    #[test]
    fn dag_is_well_formed_and_acyclic() {
        assert!(plan(&sample_ir()).is_well_formed());
    }

    #[test]
    fn texture_tasks_are_parallelizable_and_one_per_textured_element() {
        let dag = plan(&sample_ir());
        let texture_tasks: Vec<_> = dag.tasks.iter().filter(|t| t.kind == "generate_texture").collect();
        assert_eq!(texture_tasks.len(), 2);
        assert!(texture_tasks.iter().all(|t| t.parallelizable));
    }

    #[test]
    fn generate_assets_depends_on_setup_and_every_texture_task() {
        let dag = plan(&sample_ir());
        let generate_assets = dag.get(GENERATE_ASSETS).unwrap();
        assert_eq!(generate_assets.depends_on.len(), 3);
        assert!(generate_assets.depends_on.contains(&SETUP_WORKSPACE.to_string()));
    }

    #[test]
    fn generate_assets_depends_only_on_setup_when_ir_has_no_textures() {
        let mut ir = sample_ir();
        ir.assets.clear();
        let dag = plan(&ir);
        let generate_assets = dag.get(GENERATE_ASSETS).unwrap();
        assert_eq!(generate_assets.depends_on, vec![SETUP_WORKSPACE.to_string()]);
    }

    #[test]
    fn dag_still_has_exactly_one_entry_when_ir_has_no_textures() {
        let mut ir = sample_ir();
        ir.assets.clear();
        let dag = plan(&ir);
        assert_eq!(dag.entry_tasks().len(), 1);
        assert_eq!(dag.entry_tasks()[0].id, SETUP_WORKSPACE);
        assert!(dag.is_well_formed());
    }

    #[test]
    fn build_depends_on_every_other_task() {
        let dag = plan(&sample_ir());
        let build = dag.get(BUILD).unwrap();
        assert_eq!(build.depends_on.len(), dag.tasks.len() - 1);
    }
}
