use glam::Vec2;
use tilebonk::*;

struct Actor {
    id: EntityId,
    collider: Collider,
    position: Vec2,
}

impl CollisionEntity for Actor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collider(&self) -> Option<&Collider> {
        Some(&self.collider)
    }

    fn global_position(&self) -> Option<Vec2> {
        Some(self.position)
    }
}

fn main() -> tilebonk::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let cfg = GridConfig { cell_size: 16.0, width: 8, height: 8 };
    #[rustfmt::skip]
    let layout: [u8; 64] = [
        1, 1, 1, 1, 1, 1, 1, 1,
        1, 0, 0, 0, 0, 0, 0, 1,
        1, 0, 1, 1, 0, 0, 0, 1,
        1, 0, 1, 0, 0, 0, 0, 1,
        1, 0, 0, 0, 0, 1, 0, 1,
        1, 0, 0, 0, 0, 1, 0, 1,
        1, 0, 0, 0, 0, 0, 0, 1,
        1, 1, 1, 1, 1, 1, 1, 1,
    ];
    let map = GridMap::new(cfg.clone(), &layout)?;

    let body = || -> tilebonk::error::Result<Collider> {
        Ok(Collider::solid(vec![Shape::new_box(Vec2::splat(2.0), Vec2::splat(12.0))?]))
    };
    let actors = vec![
        Actor { id: EntityId(1), collider: body()?, position: Vec2::new(16.0, 16.0) },
        Actor { id: EntityId(2), collider: body()?, position: Vec2::new(48.0, 48.0) },
        Actor {
            id: EntityId(3),
            collider: Collider::solid(vec![Shape::circle(Vec2::splat(8.0), 6.0)?]),
            position: Vec2::new(64.0, 96.0),
        },
    ];
    let snapshot = CollisionSnapshot::build(&actors, true);
    let neighbours = GridNeighbours::new(cfg, Neighbourhood::Eight);

    // Actor 1 wants actor 2's cell.
    let target = actors[1].position;
    match find_next_available_position(&actors[0], target, &map, &snapshot, &neighbours) {
        Some(p) => println!("actor 1 asked for ({}, {}) and got ({}, {})", target.x, target.y, p.x, p.y),
        None => println!("actor 1 has nowhere to go"),
    }

    // Wall cell: bumped to the nearest open floor.
    let wall = Vec2::new(32.0, 32.0);
    let placed = find_available_position(&map, None, &body()?, wall, &snapshot, &neighbours);
    println!("wall target ({}, {}) -> {:?}", wall.x, wall.y, placed);

    for (from, to) in [
        (Vec2::new(20.0, 104.0), Vec2::new(110.0, 104.0)),
        (Vec2::new(20.0, 60.0), Vec2::new(110.0, 60.0)),
        (Vec2::new(100.0, 20.0), Vec2::new(100.0, 40.0)),
    ] {
        let hit = raycast(&map, from, to, Some(EntityId(1)), &snapshot);
        println!("ray ({}, {}) -> ({}, {}): {:?}", from.x, from.y, to.x, to.y, hit);
    }

    Ok(())
}
