//! End-to-end tests driving the controller state machine the way a UI
//! event loop would: mutate, then tick until a frame is published.

use std::thread;
use std::time::{Duration, Instant};

use fractalforge_core::Complex;
use fractalforge_render::EngineConfig;
use fractalforge_session::{Phase, RenderController};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fractalforge_render=debug,fractalforge_session=debug")
        .with_test_writer()
        .try_init();
}

fn controller(width: u32, height: u32) -> RenderController {
    RenderController::new(
        EngineConfig {
            threads: Some(2),
            units_per_worker: 2,
        },
        width,
        height,
    )
    .unwrap()
}

/// Tick until the controller settles, counting published frames.
fn pump(c: &mut RenderController) -> usize {
    let deadline = Instant::now() + Duration::from_secs(30);
    let mut published = 0;
    while Instant::now() < deadline {
        if c.tick() {
            published += 1;
        }
        match c.phase() {
            Phase::Rendering | Phase::Idle => thread::sleep(Duration::from_millis(1)),
            Phase::Completed | Phase::Cancelled => return published,
        }
    }
    panic!("controller did not settle within 30s");
}

#[test]
fn initial_render_publishes_a_frame() {
    init_tracing();
    let mut c = controller(96, 64);

    let published = pump(&mut c);

    assert_eq!(published, 1);
    assert_eq!(c.phase(), Phase::Completed);
    let frame = c.display().unwrap();
    assert_eq!(frame.pixels.width, 96);
    assert_eq!(frame.pixels.height, 64);
    assert_eq!(frame.generation, 1);
    // Progress resets once the frame is published.
    assert_eq!(c.progress(), (0, 0));
}

#[test]
fn rapid_pans_coalesce_into_one_render() {
    init_tracing();
    let mut c = controller(96, 64);
    pump(&mut c);

    c.pan(4, 0).unwrap();
    c.pan(4, 0).unwrap();
    c.pan(0, 3).unwrap();
    let published = pump(&mut c);

    // Three gestures, one job: only the final state was submitted.
    assert_eq!(published, 1);
    assert_eq!(c.latest_generation(), 2);
    assert_eq!(c.display().unwrap().generation, 2);
}

#[test]
fn pan_render_reuses_published_pixels() {
    init_tracing();
    let mut c = controller(96, 64);
    pump(&mut c);

    c.pan(8, 5).unwrap();
    pump(&mut c);

    let frame = c.display().unwrap();
    assert!(frame.pixels_reused > 0);
    assert!(frame.pixels_reused < 96 * 64);
}

#[test]
fn pan_after_cancelled_pan_keeps_reuse_aligned() {
    init_tracing();
    let mut a = controller(96, 64);
    let mut b = controller(96, 64);
    // A power-of-two pixel scale keeps the panned centers bitwise exact,
    // so both paths below must land on identical frames.
    for c in [&mut a, &mut b] {
        c.set_region(Complex::new(-0.75, 0.0), 3.0, 2.0).unwrap();
        pump(c);
    }

    // Two pans, where the job for the first is cancelled before publishing.
    a.pan(20, 0).unwrap();
    a.tick();
    a.pan(15, 0).unwrap();
    pump(&mut a);

    // One pan covering the same total distance.
    b.pan(35, 0).unwrap();
    pump(&mut b);

    assert_eq!(
        a.current_session().unwrap().viewport.center,
        b.current_session().unwrap().viewport.center
    );
    assert_eq!(a.display().unwrap().escape.data, b.display().unwrap().escape.data);
    assert!(a.display().unwrap().pixels_reused > 0);
}

#[test]
fn undo_and_redo_walk_the_view_history() {
    init_tracing();
    let mut c = controller(96, 64);
    pump(&mut c);
    let home = c.current_session().unwrap().viewport;

    c.pan(12, 7).unwrap();
    pump(&mut c);
    let panned = c.current_session().unwrap().viewport;
    assert_ne!(panned.center, home.center);

    assert!(c.undo().unwrap());
    pump(&mut c);
    assert_eq!(c.current_session().unwrap().viewport.center, home.center);

    assert!(c.redo().unwrap());
    pump(&mut c);
    assert_eq!(c.current_session().unwrap().viewport.center, panned.center);
}

#[test]
fn histories_are_independent_per_fractal() {
    init_tracing();
    let mut c = controller(96, 64);
    pump(&mut c);

    c.pan(10, 0).unwrap();
    pump(&mut c);

    c.select_fractal("julia").unwrap();
    pump(&mut c);
    // Fresh julia session has nothing to undo.
    assert!(!c.undo().unwrap());

    c.select_fractal("mandelbrot").unwrap();
    pump(&mut c);
    // The mandelbrot pan is still undoable.
    assert!(c.undo().unwrap());
}

#[test]
fn cancel_keeps_the_previous_frame() {
    init_tracing();
    let mut c = controller(96, 64);
    pump(&mut c);
    let before = c.display().unwrap().generation;

    // Queue an expensive render, let it start, then cancel it.
    c.resize(512, 512).unwrap();
    c.set_max_iterations(20_000).unwrap();
    c.tick();
    assert_eq!(c.phase(), Phase::Rendering);
    c.cancel_render();

    assert_eq!(c.phase(), Phase::Cancelled);
    assert_eq!(c.display().unwrap().generation, before);
}

#[test]
fn palette_switch_recolors_without_a_new_job() {
    init_tracing();
    let mut c = controller(96, 64);
    pump(&mut c);
    let generation_before = c.latest_generation();
    let pixels_before = c.display().unwrap().pixels.clone();

    c.set_palette("fire").unwrap();

    assert_eq!(c.latest_generation(), generation_before);
    assert_eq!(c.phase(), Phase::Completed);
    assert_ne!(c.display().unwrap().pixels, pixels_before);
}

#[test]
fn reset_view_returns_to_the_default_region() {
    init_tracing();
    let mut c = controller(96, 64);
    pump(&mut c);
    let home = c.current_session().unwrap().viewport;

    c.zoom_at(48, 32, 0.5).unwrap();
    pump(&mut c);
    assert_ne!(c.current_session().unwrap().viewport.scale, home.scale);

    c.reset_view().unwrap();
    pump(&mut c);
    let restored = c.current_session().unwrap().viewport;
    assert_eq!(restored.center, home.center);
    assert_eq!(restored.scale, home.scale);
}
