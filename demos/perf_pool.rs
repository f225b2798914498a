use glam::Vec2;
use std::time::Instant;
use tileslope::*;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f32 {
    lcg(seed) as f32 / u32::MAX as f32
}

fn main() -> Result<()> {
    let (w, h) = (64u32, 32u32);
    let mut visual = vec![0u32; (w * h) as usize];
    let mut seed = 7u32;
    for ty in 0..h {
        for tx in 0..w {
            let floor = ty == h - 1;
            let block = ty > h / 2 && lcg(&mut seed) % 23 == 0;
            if floor || block {
                visual[(ty * w + tx) as usize] = 1;
            }
        }
    }
    let cfg = PhysicsConfig { enable_timing: true, ..Default::default() };
    let map = CollisionMap::from_visual(cfg, w, h, &visual)?;
    let size = map.size();
    let mut world = World::new(map);

    let bursts = 200usize;
    let per_burst = 40usize;
    let t0 = Instant::now();
    let mut overlaps = 0usize;
    for frame in 0..bursts {
        // A burst of sparks and a few pickups every frame; sparks live ~30 frames.
        for k in 0..per_burst {
            let pos = Vec2::new(unit(&mut seed) * size.x, unit(&mut seed) * size.y * 0.5);
            let vel = Vec2::new(unit(&mut seed) * 4.0 - 2.0, -unit(&mut seed) * 3.0);
            let (_, b) = world.acquire();
            if k % 8 == 0 {
                b.spawn_collectable(pos, vel, 60.0);
            } else {
                b.spawn_particle(pos, vel, 30.0, Color::from_rgba8(255, 200, 80, 255));
            }
        }
        world.step(1.0, |a, b| {
            if a.overlay_object(b) {
                overlaps += 1;
            }
        });
        if frame % 50 == 0 {
            let s = world.stats();
            if let Some(t) = world.timing() {
                println!(
                    "frame={} slots={} live={} visible={} pairs={} step={:.3}ms (integrate={:.3}ms tiles={:.3}ms pairs={:.3}ms)",
                    frame, s.slots, s.live, s.visible, s.pairs, t.step_ms, t.integrate_ms, t.tiles_ms, t.pairs_ms
                );
            }
        }
    }
    println!(
        "{} frames in {:?}, high-water slots={} overlaps={}",
        bursts,
        t0.elapsed(),
        world.bodies().len(),
        overlaps
    );
    Ok(())
}
