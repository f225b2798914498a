use glam::Vec2;

use std::time::Instant;

use crate::api::{Collidable, Pooled, Updatable};
use crate::body::{Body, Tuning};
use crate::kinds::BodyKind;
use crate::map::CollisionMap;
use crate::pool::ObjectPool;
use crate::types::*;
use crate::visible::VisibleBuffer;

/// One stage: the collision map, the camera and every pooled body.
pub struct World {
    pub map: CollisionMap,
    pub camera: Camera,
    pub frame_counter: u32,

    bodies: ObjectPool<Body<BodyKind>>,
    visible: VisibleBuffer,

    // Platform top edges and displacement, rebuilt each step
    platforms: Vec<(usize, Vec2, Vec2, Vec2)>,

    last_stats: StepStats,
    // Timing for the last step (optional)
    last_timing: Option<StepTiming>,
}

impl World {
    /// Camera starts out covering the whole map.
    pub fn new(map: CollisionMap) -> Self {
        let camera = Camera::new(Vec2::ZERO, map.size());
        Self {
            map,
            camera,
            frame_counter: 0,
            bodies: ObjectPool::new(),
            visible: VisibleBuffer::new(),
            platforms: Vec::new(),
            last_stats: StepStats::default(),
            last_timing: None,
        }
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// A dead slot ready to spawn into, tuned to this map's config.
    pub fn acquire(&mut self) -> (usize, &mut Body<BodyKind>) {
        let tuning = Tuning::from(&self.map.cfg);
        let (index, body) = self.bodies.acquire();
        body.state.set_tuning(tuning);
        (index, body)
    }

    pub fn bodies(&self) -> &ObjectPool<Body<BodyKind>> {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut ObjectPool<Body<BodyKind>> {
        &mut self.bodies
    }

    /// Slot indices that were in view during the last step.
    pub fn visible(&self) -> &[usize] {
        self.visible.indices()
    }

    /// Advance one tick. `on_pair` sees every unordered pair of bodies that
    /// are still active and in view after movement.
    pub fn step<F>(&mut self, tick: f32, mut on_pair: F)
    where
        F: FnMut(&mut Body<BodyKind>, &mut Body<BodyKind>),
    {
        let timing = self.map.cfg.enable_timing;
        let t_all = if timing { Some(Instant::now()) } else { None };
        self.frame_counter = self.frame_counter.wrapping_add(1);
        let camera = self.camera;

        for body in self.bodies.iter_mut() {
            body.camera_check(&camera, tick);
        }
        self.visible.refresh(self.bodies.slots());

        // Dying bodies are left out of the visible buffer but still animate,
        // so movement covers every live body in view.
        let t0 = if timing { Some(Instant::now()) } else { None };
        for body in self.bodies.iter_mut().filter(|b| b.is_in_camera()) {
            body.update(tick);
        }
        let integrate_ms = elapsed_ms(t0);

        let t1 = if timing { Some(Instant::now()) } else { None };
        for body in self.bodies.iter_mut().filter(|b| b.is_in_camera()) {
            self.map.resolve(body, tick);
            body.camera_check(&camera, tick);
        }
        let riders = self.ride_platforms(tick);
        let tiles_ms = elapsed_ms(t1);

        let t2 = if timing { Some(Instant::now()) } else { None };
        let pairs = self
            .visible
            .for_each_pair(self.bodies.slots_mut(), |a, b| on_pair(a, b));
        let pairs_ms = elapsed_ms(t2);

        self.bodies.reclaim();
        self.last_stats = StepStats {
            slots: self.bodies.len(),
            live: self.bodies.live_count(),
            visible: self.visible.len(),
            pairs,
            riders,
        };
        self.last_timing = t_all.map(|t| StepTiming {
            step_ms: t.elapsed().as_secs_f64() * 1000.0,
            integrate_ms,
            tiles_ms,
            pairs_ms,
        });
        log::trace!(
            "frame {}: {} visible of {} live, {} pairs, {} riders",
            self.frame_counter,
            self.last_stats.visible,
            self.last_stats.live,
            pairs,
            riders
        );
    }

    /// Carry bodies standing on a moving platform along with it.
    ///
    /// Each candidate is shifted by the platform's displacement and swept
    /// against the platform's top edge; bodies that miss are put back.
    fn ride_platforms(&mut self, tick: f32) -> usize {
        self.platforms.clear();
        for &i in self.visible.indices() {
            let p = &self.bodies.slots()[i];
            if !p.behavior.is_platform() || !p.is_active() {
                continue;
            }
            let cb = p.state.collision_box;
            let (min, max) = (cb.min(p.state.pos), cb.max(p.state.pos));
            self.platforms.push((
                i,
                Vec2::new(min.x, min.y),
                Vec2::new(max.x, min.y),
                p.state.pos - p.state.old_pos,
            ));
        }

        let mut riders = 0;
        let slots = self.bodies.slots_mut();
        for &(pi, a, b, delta) in &self.platforms {
            for &i in self.visible.indices() {
                let rider = &mut slots[i];
                if i == pi
                    || rider.behavior.is_platform()
                    || !rider.is_active()
                    || !rider.spawn_config().take_collisions
                {
                    continue;
                }
                let (pos, old_pos) = (rider.state.pos, rider.state.old_pos);
                rider.state.translate(delta);
                if rider.slope_collision(a.x, a.y, b.x, b.y, SlopeDir::Floor, tick) {
                    riders += 1;
                } else {
                    rider.state.pos = pos;
                    rider.state.old_pos = old_pos;
                }
            }
        }
        riders
    }

    /// Counters for the last completed step.
    pub fn stats(&self) -> StepStats {
        self.last_stats
    }

    /// Timing breakdown for the last step, when `enable_timing` is set.
    pub fn timing(&self) -> Option<StepTiming> {
        self.last_timing
    }
}

fn elapsed_ms(start: Option<Instant>) -> f64 {
    start.map_or(0.0, |t| t.elapsed().as_secs_f64() * 1000.0)
}
