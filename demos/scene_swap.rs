//=========================================================================
// Scene Swap Demo
//
// Title screen → press Enter → the level loads in the background while
// the title keeps running → the frame hook confirms once resources are
// in → the level takes over. Escape goes back.
//
// Run with:
//   RUST_LOG=debug cargo run --example scene_swap
//
//=========================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use halcyon_engine::core::id::UniqueId;
use halcyon_engine::prelude::*;
use log::info;

//=== Scenes ==============================================================

/// Which scene the frame hook should swap to next, set by key listeners.
#[derive(Default)]
struct SwapRequests {
    to_level: AtomicBool,
    to_title: AtomicBool,
}

struct Title {
    requests: Arc<SwapRequests>,
    listener: Option<UniqueId>,
}

impl Scene for Title {
    fn identifier(&self) -> &str {
        "title"
    }

    fn setup(&mut self, services: &ContextServices) {
        let requests = Arc::clone(&self.requests);
        self.listener = Some(services.event_manager().register_key_listener(
            KeyCode::Enter,
            move |event| {
                if event.action == InputAction::Press {
                    requests.to_level.store(true, Ordering::SeqCst);
                }
            },
        ));
    }

    fn teardown(&mut self, services: &ContextServices) {
        if let Some(id) = self.listener.take() {
            services.event_manager().remove_key_listener(id);
        }
    }
}

struct Level {
    requests: Arc<SwapRequests>,
    listener: Option<UniqueId>,
}

impl Scene for Level {
    fn identifier(&self) -> &str {
        "level-1"
    }

    fn resources(&self) -> Vec<ResourceRequest> {
        vec![
            ResourceRequest::new(ResourceKind::Model, "level-1/terrain.obj"),
            ResourceRequest::new(ResourceKind::Texture, "level-1/terrain.png"),
            ResourceRequest::new(ResourceKind::Audio, "level-1/ambience.ogg"),
        ]
    }

    fn setup(&mut self, services: &ContextServices) {
        let requests = Arc::clone(&self.requests);
        self.listener = Some(services.event_manager().register_key_listener(
            KeyCode::Escape,
            move |event| {
                if event.action == InputAction::Press {
                    requests.to_title.store(true, Ordering::SeqCst);
                }
            },
        ));

        let loader = Arc::clone(services.loader());
        services.executor().submit(move || {
            let progress = loader.progress();
            info!("Level assets: {} of {} bytes", progress.bytes_read, progress.bytes_total);
        });
    }

    fn teardown(&mut self, services: &ContextServices) {
        if let Some(id) = self.listener.take() {
            services.event_manager().remove_key_listener(id);
        }
    }
}

//=== Frame Hook ==========================================================

fn clear_color(scene: &str) -> [u8; 4] {
    match scene {
        "title" => [20, 24, 48, 255],
        _ => [32, 96, 48, 255],
    }
}

fn main() -> Result<(), PlatformError> {
    env_logger::init();

    let requests = Arc::new(SwapRequests::default());
    let title = Title {
        requests: Arc::clone(&requests),
        listener: None,
    };

    let engine = EngineBuilder::new()
        .with_title("Halcyon - scene swap")
        .with_size(960, 540)
        .with_loader_factory(FileLoaderFactory::new("assets"))
        .build();

    engine.run_with(title, move |context: &mut EngineContext, surface: &WindowSurface| {
        // "Render": clear to the scene's colour.
        let (width, height) = context.frame_size();
        let mut frame = FrameImage::new(width, height);
        let color = clear_color(context.scene().identifier());
        for pixel in frame.pixels_mut().chunks_exact_mut(FrameImage::CHANNELS) {
            pixel.copy_from_slice(&color);
        }
        surface.present(frame);

        if requests.to_level.swap(false, Ordering::SeqCst) {
            context.request_swap(Box::new(Level {
                requests: Arc::clone(&requests),
                listener: None,
            }));
        }
        if requests.to_title.swap(false, Ordering::SeqCst) {
            context.request_swap(Box::new(Title {
                requests: Arc::clone(&requests),
                listener: None,
            }));
        }

        // Nothing to upload: accept as soon as the bytes are in.
        if let Some(token) = context.pending_swap() {
            if token.state() == SwapState::ResourcesReady {
                token.confirm();
            }
        }
    })
}
