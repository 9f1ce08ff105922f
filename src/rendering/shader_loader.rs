use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, channel},
        Arc, RwLock,
    },
    time::Duration,
};

use anyhow::Context;
use id_arena::{Arena, Id};
use naga::{
    back::wgsl::WriterFlags,
    valid::{Capabilities, ValidationFlags},
};
use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
};
use notify_debouncer_mini::{
    new_debouncer_opt, notify::*, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::{PollType, RenderPipeline};

const SHARED_MODULES_FOLDER: &str = "shared";

/// Shared modules in dependency order, each may only import the ones before it.
pub const SHARED_MODULES: [&str; 4] = [
    "frame.wgsl",
    "standard_vertex.wgsl",
    "material.wgsl",
    "lighting.wgsl",
];

type PipelineFactory = Box<
    dyn Sync
        + Send
        + Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<wgpu::RenderPipeline>,
>;

#[derive(Debug, Clone)]
pub(crate) struct ShaderDefinition {
    pub name: &'static str,
    pub path: &'static str,
}

pub struct ShaderEntry {
    pipeline_id: PipelineId,
    def: ShaderDefinition,
    factory: PipelineFactory,
}

impl ShaderEntry {
    pub fn new(pipeline_id: PipelineId, def: ShaderDefinition, factory: PipelineFactory) -> Self {
        Self {
            pipeline_id,
            def,
            factory,
        }
    }
}

pub type PipelineId = Id<PipelineCacheEntry>;

#[derive(Default)]
pub struct PipelineCacheEntry(Option<wgpu::RenderPipeline>);

impl PipelineCacheEntry {
    pub fn set_pipeline(&mut self, pipeline: wgpu::RenderPipeline) {
        self.0 = Some(pipeline);
    }
}

#[derive(Default)]
pub struct PipelineCacheBuilder {
    shaders: Arena<ShaderEntry>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shader(
        &mut self,
        shader_def: ShaderDefinition,
        factory: PipelineFactory,
    ) -> PipelineId {
        let pipeline_id = self.pipelines.alloc(PipelineCacheEntry::default());
        let shader_entry = ShaderEntry::new(pipeline_id, shader_def, factory);
        self.shaders.alloc(shader_entry);
        pipeline_id
    }

    pub fn build(self) -> PipelineCache {
        PipelineCache {
            shaders: Arc::new(self.shaders),
            pipelines: self.pipelines,
        }
    }
}

pub struct PipelineCache {
    shaders: Arc<Arena<ShaderEntry>>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCache {
    pub fn get(&self, id: PipelineId) -> Option<&RenderPipeline> {
        self.pipelines.get(id).and_then(|entry| entry.0.as_ref())
    }

    pub fn get_entry_mut(&mut self, id: PipelineId) -> Option<&mut PipelineCacheEntry> {
        self.pipelines.get_mut(id)
    }

    pub fn iter_shaders_and_pipelines_mut(
        &mut self,
    ) -> impl Iterator<Item = (&ShaderEntry, &mut PipelineCacheEntry)> {
        // Shaders and pipelines are allocated in pairs by `add_shader`.
        self.shaders
            .iter()
            .map(|(_, shader_entry)| shader_entry)
            .zip(
                self.pipelines
                    .iter_mut()
                    .map(|(_, pipeline_entry)| pipeline_entry),
            )
    }
}

type CompiledPipeline = (&'static str, PipelineId, wgpu::RenderPipeline);

// Loads and compiles shaders to pipelines, recompiling them on the watcher thread when
// their files change.
pub(crate) struct ShaderLoader {
    pub cache: PipelineCache,
    device: wgpu::Device,
    shader_dir: PathBuf,
    receiver: mpsc::Receiver<CompiledPipeline>,
    composer: Arc<RwLock<Composer>>,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl ShaderLoader {
    pub fn new(
        device: wgpu::Device,
        shader_dir: impl Into<PathBuf>,
        cache_builder: PipelineCacheBuilder,
    ) -> anyhow::Result<Self> {
        let shader_dir: PathBuf = shader_dir.into();
        let cache = cache_builder.build();

        let (send_new_pipelines, recv_new_pipelines) = channel();

        let composer = create_composer(&shader_dir)?;
        let composer = Arc::new(RwLock::new(composer));

        let watcher_state = WatcherState {
            device: device.clone(),
            shader_dir: shader_dir.clone(),
            shaders: cache.shaders.clone(),
            composer: composer.clone(),
            sender: send_new_pipelines,
        };

        let mut debouncer = new_debouncer_opt(
            notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
            move |res: DebounceEventResult| match res {
                Ok(events) => {
                    for event in events {
                        if event.kind == DebouncedEventKind::Any {
                            watcher_state.file_changed(&event.path);
                        }
                    }
                }
                Err(e) => log::error!("Error debouncing shader changes: {}", e),
            },
        )
        .context("Failed to create shader watcher")?;

        let absolute_shader_folder = shader_dir
            .canonicalize()
            .with_context(|| format!("Shader folder {} not found", shader_dir.display()))?;

        debouncer
            .watcher()
            .watch(&absolute_shader_folder, RecursiveMode::Recursive)
            .context("Failed to watch shader folder")?;

        let mut shader_loader = Self {
            device,
            shader_dir,
            cache,
            receiver: recv_new_pipelines,
            composer,
            _debouncer: debouncer,
        };

        shader_loader.create_all_pipelines()?;

        Ok(shader_loader)
    }

    pub(crate) fn create_all_pipelines(&mut self) -> anyhow::Result<()> {
        for (shader, pipeline_entry) in self.cache.iter_shaders_and_pipelines_mut() {
            let pipeline = compile_file(
                &self.device,
                &self.shader_dir,
                &shader.def,
                &shader.factory,
                &self.composer,
            )
            .with_context(|| format!("Failed to compile shader: {}", shader.def.name))?;
            pipeline_entry.set_pipeline(pipeline);
        }

        Ok(())
    }

    pub(crate) fn load_pending_shaders(&mut self) {
        while let Ok((name, pipeline_id, pipeline)) = self.receiver.try_recv() {
            if let Some(entry) = self.cache.get_entry_mut(pipeline_id) {
                log::info!("Shader reloaded: {}", name);
                entry.set_pipeline(pipeline);
            }
        }
    }
}

struct WatcherState {
    device: wgpu::Device,
    shader_dir: PathBuf,
    shaders: Arc<Arena<ShaderEntry>>,
    composer: Arc<RwLock<Composer>>,
    sender: mpsc::Sender<CompiledPipeline>,
}

impl WatcherState {
    fn file_changed(&self, path: &Path) {
        let shared_changed = path
            .parent()
            .is_some_and(|parent| parent.ends_with(SHARED_MODULES_FOLDER));

        if shared_changed {
            // Every shader may import the changed module.
            match create_composer(&self.shader_dir) {
                Ok(composer) => match self.composer.write() {
                    Ok(mut current) => *current = composer,
                    Err(_) => {
                        log::error!("Shader composer lock poisoned");
                        return;
                    }
                },
                Err(e) => {
                    log::error!("Failed to reload shared shader modules: {:?}", e);
                    return;
                }
            }

            for (_, entry) in self.shaders.iter() {
                self.recompile(entry);
            }
        } else if let Some((_, entry)) = self
            .shaders
            .iter()
            .find(|(_, entry)| path.ends_with(entry.def.path))
        {
            self.recompile(entry);
        }
    }

    fn recompile(&self, entry: &ShaderEntry) {
        match compile_file(
            &self.device,
            &self.shader_dir,
            &entry.def,
            &entry.factory,
            &self.composer,
        ) {
            Ok(pipeline) => {
                if self
                    .sender
                    .send((entry.def.name, entry.pipeline_id, pipeline))
                    .is_err()
                {
                    log::warn!("Shader loader is gone, dropping {}", entry.def.name);
                }
            }
            Err(e) => log::error!("Failed to load shader {}: {:?}", entry.def.name, e),
        }
    }
}

/// Runs a shader through the composer and returns plain WGSL.
pub fn compose_shader(
    composer: &mut Composer,
    file_path: &str,
    source: &str,
) -> anyhow::Result<String> {
    let module = composer
        .make_naga_module(NagaModuleDescriptor {
            file_path,
            source,
            ..Default::default()
        })
        .with_context(|| format!("Failed to create Naga module from {}", file_path))?;

    // wgpu runs the full validator again when the shader module is created.
    let info = naga::valid::Validator::new(ValidationFlags::empty(), Capabilities::all())
        .validate(&module)
        .context("Failed to validate Naga module")?;

    naga::back::wgsl::write_string(&module, &info, WriterFlags::empty())
        .context("Failed to convert Naga module to WGSL string")
}

fn compile_file(
    device: &wgpu::Device,
    shader_dir: &Path,
    shader_def: &ShaderDefinition,
    factory: &PipelineFactory,
    composer: &RwLock<Composer>,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let path = shader_dir.join(shader_def.path);
    let shader_code = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read shader file {}", path.display()))?;

    let file_path = path.to_string_lossy().to_string();

    let shader_code = {
        let mut composer = composer
            .write()
            .map_err(|_| anyhow::anyhow!("Shader composer lock poisoned"))?;
        compose_shader(&mut composer, &file_path, &shader_code)?
    };

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = factory(device, shader_def, &shader_code);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    let error = block_on(device.pop_error_scope());

    if let Some(error) = error {
        return Err(anyhow::anyhow!(
            "Shader compilation failed for {}: {}",
            shader_def.name,
            error
        ));
    };

    pipeline
}

pub fn create_composer(shader_dir: &Path) -> anyhow::Result<Composer> {
    let mut composer = Composer::default();

    for module in SHARED_MODULES {
        let path = shader_dir.join(SHARED_MODULES_FOLDER).join(module);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read shared shader module {}", path.display()))?;

        let file_path = path.to_string_lossy().to_string();

        composer
            .add_composable_module(ComposableModuleDescriptor {
                source: &source,
                file_path: &file_path,
                language: ShaderLanguage::Wgsl,
                ..Default::default()
            })
            .with_context(|| format!("Failed to add shared shader module: {}", file_path))?;
    }

    Ok(composer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADER_DIR: &str = "assets/shaders";

    #[test]
    fn shared_modules_compose() {
        create_composer(Path::new(SHADER_DIR)).unwrap();
    }

    #[test]
    fn every_shader_composes_to_wgsl() {
        let mut composer = create_composer(Path::new(SHADER_DIR)).unwrap();

        for file in [
            "lit.wgsl",
            "layered.wgsl",
            "uvs.wgsl",
            "normals.wgsl",
            "custom.wgsl",
            "sky.wgsl",
        ] {
            let path = Path::new(SHADER_DIR).join(file);
            let source = std::fs::read_to_string(&path).unwrap();
            let wgsl = compose_shader(&mut composer, &path.to_string_lossy(), &source)
                .unwrap_or_else(|e| panic!("{file}: {e:?}"));

            assert!(wgsl.contains("fn vs_main"), "{file} has no vertex entry point");
            assert!(wgsl.contains("fn fs_main"), "{file} has no fragment entry point");
        }
    }

    #[test]
    fn sky_applies_the_global_tint() {
        let mut composer = create_composer(Path::new(SHADER_DIR)).unwrap();
        let path = Path::new(SHADER_DIR).join("sky.wgsl");
        let source = std::fs::read_to_string(&path).unwrap();

        let module = composer
            .make_naga_module(NagaModuleDescriptor {
                source: &source,
                file_path: &path.to_string_lossy(),
                ..Default::default()
            })
            .unwrap();

        let fragment = module
            .entry_points
            .iter()
            .find(|entry| entry.name == "fs_main")
            .unwrap();
        let reads_ps_data = fragment.function.expressions.iter().any(|(_, expr)| {
            matches!(expr, naga::Expression::GlobalVariable(handle)
                if module.global_variables[*handle].binding
                    == Some(naga::ResourceBinding { group: 0, binding: 1 }))
        });
        assert!(reads_ps_data, "sky fragment shader ignores ps_data");
    }

    #[test]
    fn missing_shader_folder_is_an_error() {
        assert!(create_composer(Path::new("does/not/exist")).is_err());
    }
}
