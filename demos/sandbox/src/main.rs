// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Inflight Sandbox
// Drives the frame ring over a procedural scene on the headless backend.
// There is no windowed GPU backend: nothing reaches a screen, and the log
// (fps, stalls, fence values) is the output. Any `GraphicsDevice`,
// `CommandQueue` and `SwapChain` implementation can be swapped in below.

mod camera;
mod scene;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use inflight_agents::RenderAgent;
use inflight_core::math::Vec3;
use inflight_core::renderer::{Light, RendererSettings};
use inflight_infra::graphics::headless::{HeadlessDevice, HeadlessQueue, HeadlessSwapChain};

use camera::{FrameTimer, OrbitCamera};
use scene::DemoScene;

const FRAMES_TO_RUN: u32 = 1500;
const SWAP_CHAIN_BUFFERS: usize = 2;
/// Simulated GPU time per submission.
const GPU_LATENCY: Duration = Duration::from_micros(800);

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = match std::env::args().nth(1) {
        Some(path) => RendererSettings::load(path)?,
        None => RendererSettings::default(),
    };
    settings.validate()?;
    let (width, height) = (settings.viewport_width, settings.viewport_height);
    let aspect = settings.aspect_ratio();

    let device = Arc::new(HeadlessDevice::new());
    let queue = Arc::new(HeadlessQueue::with_latency(GPU_LATENCY));
    let swap_chain = HeadlessSwapChain::new(&device, SWAP_CHAIN_BUFFERS, width, height)?;

    let pipelines = scene::create_pipelines(device.as_ref())?;
    let bindings = scene::create_bindings(device.as_ref())?;
    let mut demo = DemoScene::build(device.as_ref(), settings.frame_count)?;

    let mut agent = RenderAgent::new(
        device.clone(),
        queue.clone(),
        Box::new(swap_chain),
        settings,
        pipelines,
        bindings,
        &mut demo.registry,
    )?;

    let lights = [
        Light::directional(Vec3::new(0.577, -0.577, 0.577), Vec3::new(0.6, 0.6, 0.6)),
        Light::directional(Vec3::new(-0.577, -0.577, 0.577), Vec3::new(0.3, 0.3, 0.3)),
        Light::directional(Vec3::new(0.0, -0.707, -0.707), Vec3::new(0.15, 0.15, 0.15)),
    ];
    let mut camera = OrbitCamera::new(aspect);
    let mut timer = FrameTimer::new();

    for _ in 0..FRAMES_TO_RUN {
        let time = timer.tick();
        camera.orbit(0.25 * time.delta);
        demo.animate(time.total)?;

        agent.on_frame_advance(&mut demo.registry, &camera, &lights, time)?;
        agent.on_frame_render(&demo.registry)?;
    }

    agent.on_shutdown()?;

    let stats = agent.stats();
    log::info!(
        "Sandbox: {} frames, {} stalls, {:.2?} blocked, {} lists executed",
        stats.frames_submitted,
        stats.stalls,
        stats.total_wait,
        queue.log().lists_executed()
    );

    demo.registry.destroy(agent.device().as_ref())?;
    Ok(())
}
