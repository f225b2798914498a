use glam::Vec2;
use tileslope::*;

const W: u32 = 16;
const H: u32 = 6;

fn main() -> Result<()> {
    // Ground row, then a hill: ramp up, three blocks, ramp down.
    let mut visual = vec![0u32; (W * H) as usize];
    let mut codes = vec![CODE_INHERIT; (W * H) as usize];
    for tx in 0..W as usize {
        visual[(H as usize - 1) * W as usize + tx] = 1;
    }
    let hill = [(5, 3u16), (6, 2), (7, 2), (8, 2), (9, 4)];
    for (tx, code) in hill {
        let i = (H as usize - 2) * W as usize + tx;
        visual[i] = 1;
        codes[i] = code;
    }

    let cfg = PhysicsConfig { enable_timing: true, ..Default::default() };
    let mut map = CollisionMap::new(cfg, W, H, &visual, &codes)?;
    map.set_water_level(Some(70.0));
    let mut world = World::new(map);

    let (walker, b) = world.acquire();
    b.spawn_walker(Vec2::new(24.0, 56.0), 1.0, 1.5, Vec2::new(8.0, 16.0));
    let (_, b) = world.acquire();
    b.spawn_projectile(Vec2::new(8.0, 40.0), Vec2::new(4.0, 0.0), 120.0);

    for frame in 0..160 {
        if frame == 80 {
            // Switch block: raise a wall in the walker's way.
            world.map.set_tile_code(13, 4, 2)?;
        }
        world.step(1.0, |a, b| {
            if a.overlay_object(b) {
                println!("overlap at frame {}", frame);
            }
        });
        if frame % 8 == 0 {
            if let Some(b) = world.bodies().get(walker) {
                println!(
                    "frame {:3} pos=({:6.2},{:6.2}) speed=({:5.2},{:5.2}) ground={} slope={:5.2} water={}",
                    frame,
                    b.state.pos.x,
                    b.state.pos.y,
                    b.state.speed.x,
                    b.state.speed.y,
                    b.state.touch_surface,
                    b.state.steepness_factor,
                    b.state.in_water
                );
            }
        }
    }

    let s = world.stats();
    println!("slots={} live={} visible={} pairs={}", s.slots, s.live, s.visible, s.pairs);
    if let Some(t) = world.timing() {
        println!(
            "timing: step={:.3}ms integrate={:.3}ms tiles={:.3}ms pairs={:.3}ms",
            t.step_ms, t.integrate_ms, t.tiles_ms, t.pairs_ms
        );
    }
    Ok(())
}
