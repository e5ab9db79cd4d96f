//! Erasing
//!
//! Each eraser application clips the footprint out of every region it
//! touches on the active layer. Afterwards the body's remaining regions must
//! still form one connected group; if clipping disconnected them, the
//! largest group keeps the original body and every other group is spawned as
//! its own body. A body object never represents two physically disjoint
//! pieces.

use glam::Vec2;

use crate::body::{BodyId, BodyStore, PaintLayer};
use crate::config::SandboxConfig;
use crate::events::SandboxEvent;
use crate::geometry::{difference, touches_or_overlaps, Polygon, AREA_EPSILON};
use crate::region::MaterialRegion;
use crate::world::PhysicsWorld;

/// Apply one eraser footprint (world space). Returns true when any region
/// changed. Bodies are fully resolved one at a time: a body's split is
/// finished before the next body is considered.
pub fn erase_with_footprint(
    config: &SandboxConfig,
    store: &mut BodyStore,
    world: &mut PhysicsWorld,
    events: &mut Vec<SandboxEvent>,
    eraser: &Polygon,
    layer: PaintLayer,
) -> bool {
    let eraser_aabb = eraser.aabb();
    let mut changed_any = false;

    for id in store.ids() {
        let Some(body) = store.get(id) else {
            continue;
        };
        if body.layer != layer {
            continue;
        }
        let Some(aabb) = body.world_aabb(world) else {
            continue;
        };
        if !aabb.overlaps(&eraser_aabb) {
            continue;
        }
        changed_any |= erase_one_body(config, store, world, events, eraser, id);
    }
    changed_any
}

fn erase_one_body(
    config: &SandboxConfig,
    store: &mut BodyStore,
    world: &mut PhysicsWorld,
    events: &mut Vec<SandboxEvent>,
    eraser: &Polygon,
    id: BodyId,
) -> bool {
    let Some(body) = store.get_mut(id) else {
        return false;
    };
    let Some((pos, angle)) = world.pose(body.handle) else {
        return false;
    };
    let local_eraser = eraser.to_local(pos, angle);
    let local_aabb = local_eraser.aabb();

    // Clip the eraser out of every touched region.
    let mut changed = false;
    let old_regions = std::mem::take(&mut body.regions);
    for region in old_regions {
        if !region.polygon().aabb().overlaps(&local_aabb) {
            body.regions.push(region);
            continue;
        }
        let pieces = difference(region.polygon(), &local_eraser);
        let kept_area: f32 = pieces.iter().map(Polygon::area).sum();
        if pieces.len() != 1 || (kept_area - region.area()).abs() > AREA_EPSILON {
            changed = true;
        }
        for piece in pieces {
            if piece.area() >= config.draw.min_region_area {
                body.regions
                    .push(MaterialRegion::new(piece, region.material));
            }
        }
    }

    if body.regions.is_empty() {
        println!("[Erase] body {:?} fully erased", id);
        store.despawn(world, id);
        events.push(SandboxEvent::BodyDestroyed { body: id });
        return true;
    }
    if !changed {
        return false;
    }

    let components = connected_components(&body.regions);
    if components.len() <= 1 {
        body.rebuild_physics(world, &config.body);
        return true;
    }

    // Disconnected: the largest-area component keeps this body, the rest
    // become new bodies at their own centroids.
    let mut groups: Vec<(f32, Vec2, Vec<usize>)> = components
        .into_iter()
        .map(|indices| {
            let mut area = 0.0;
            let mut weighted = Vec2::ZERO;
            for &i in &indices {
                let a = body.regions[i].area();
                weighted += body.regions[i].centroid() * a;
                area += a;
            }
            let centroid = if area > AREA_EPSILON {
                weighted / area
            } else {
                Vec2::ZERO
            };
            (area, centroid, indices)
        })
        .collect();
    groups.sort_by(|a, b| b.0.total_cmp(&a.0));

    let is_static = body.is_static;
    let layer = body.layer;
    let handle = body.handle;

    // Pull every region out, then deal them back per component.
    let mut slots: Vec<Option<MaterialRegion>> =
        std::mem::take(&mut body.regions).into_iter().map(Some).collect();
    let mut spawn_list: Vec<(Vec2, Vec<MaterialRegion>)> = Vec::new();
    for (gi, (_, centroid, indices)) in groups.iter().enumerate() {
        let regions: Vec<MaterialRegion> = indices
            .iter()
            .map(|&i| slots[i].take().expect("region dealt once"))
            .collect();
        if gi == 0 {
            body.regions = regions;
        } else {
            let mut local = regions;
            for region in &mut local {
                let moved = region.polygon().translated(-*centroid);
                region.set_polygon(moved);
            }
            spawn_list.push((*centroid, local));
        }
    }
    body.rebuild_physics(world, &config.body);

    // Velocity of the material point each piece departs from.
    let (linvel, angvel, world_com) = world
        .bodies
        .get(handle)
        .map(|b| {
            let v = b.linvel();
            let c = b.center_of_mass();
            (Vec2::new(v.x, v.y), b.angvel(), Vec2::new(c.x, c.y))
        })
        .unwrap_or((Vec2::ZERO, 0.0, pos));

    let mut spawned = Vec::new();
    for (local_centroid, regions) in spawn_list {
        let world_centroid = rotate(local_centroid, angle) + pos;
        let r = world_centroid - world_com;
        let point_vel = linvel + angvel * Vec2::new(-r.y, r.x);
        let new_id = store.spawn(
            world,
            &config.body,
            regions,
            world_centroid,
            angle,
            layer,
            is_static,
            Some((point_vel, angvel)),
        );
        spawned.push(new_id);
    }
    println!(
        "[Erase] body {:?} split into {} pieces",
        id,
        spawned.len() + 1
    );
    events.push(SandboxEvent::BodySplit {
        source: id,
        spawned,
    });
    true
}

fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Group region indices into connected components. Two regions are adjacent
/// when their polygons touch or overlap (their union collapses to a single
/// polygon); the search is a plain breadth-first flood over that graph.
pub fn connected_components(regions: &[MaterialRegion]) -> Vec<Vec<usize>> {
    let n = regions.len();
    let aabbs: Vec<_> = regions
        .iter()
        .map(|r| r.polygon().aabb().grown(AREA_EPSILON))
        .collect();
    let mut visited = vec![false; n];
    let mut components = Vec::new();

    for seed in 0..n {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut component = vec![seed];
        let mut queue = std::collections::VecDeque::from([seed]);
        while let Some(i) = queue.pop_front() {
            for j in 0..n {
                if visited[j] || !aabbs[i].overlaps(&aabbs[j]) {
                    continue;
                }
                if touches_or_overlaps(regions[i].polygon(), regions[j].polygon()) {
                    visited[j] = true;
                    component.push(j);
                    queue.push_back(j);
                }
            }
        }
        components.push(component);
    }
    components
}
