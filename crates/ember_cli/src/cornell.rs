//! The Cornell box, built from triangle meshes.
//!
//! Coordinates follow the measured box: millimetres, y up, the open side
//! facing -z.

use ember_tracer::{Camera, Color, Lambertian, Material, SceneBuilder, TriangleMesh, Vec3};
use std::sync::Arc;

const LIGHT_EMISSION: Color = Color::new(47.8348, 38.5664, 31.0808);

fn quad(points: [[f32; 3]; 4], material: &Arc<dyn Material>) -> TriangleMesh {
    let [a, b, c, d] = points.map(Vec3::from_array);
    TriangleMesh::quad(a, b, c, d, material.clone())
}

/// Top and four sides of a block, one quad each.
fn block(faces: [[[f32; 3]; 4]; 5], material: &Arc<dyn Material>) -> TriangleMesh {
    let vertices: Vec<Vec3> = faces.iter().flatten().copied().map(Vec3::from_array).collect();
    let triangles: Vec<[usize; 3]> = (0..faces.len())
        .flat_map(|f| {
            let base = 4 * f;
            [[base, base + 1, base + 2], [base, base + 2, base + 3]]
        })
        .collect();
    TriangleMesh::new(&vertices, &triangles, material.clone())
}

/// Add the walls, both blocks and the ceiling light to `builder`.
pub fn populate(builder: SceneBuilder) -> SceneBuilder {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.63, 0.065, 0.05)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.14, 0.45, 0.091)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.725, 0.71, 0.68)));
    let light: Arc<dyn Material> =
        Arc::new(Lambertian::new(Color::splat(0.65)).with_emission(LIGHT_EMISSION));

    let floor = quad(
        [[552.8, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 559.2], [549.6, 0.0, 559.2]],
        &white,
    );
    let ceiling = quad(
        [[556.0, 548.8, 0.0], [556.0, 548.8, 559.2], [0.0, 548.8, 559.2], [0.0, 548.8, 0.0]],
        &white,
    );
    let back = quad(
        [[549.6, 0.0, 559.2], [0.0, 0.0, 559.2], [0.0, 548.8, 559.2], [556.0, 548.8, 559.2]],
        &white,
    );
    let right = quad(
        [[0.0, 0.0, 559.2], [0.0, 0.0, 0.0], [0.0, 548.8, 0.0], [0.0, 548.8, 559.2]],
        &green,
    );
    let left = quad(
        [[552.8, 0.0, 0.0], [549.6, 0.0, 559.2], [556.0, 548.8, 559.2], [556.0, 548.8, 0.0]],
        &red,
    );

    // Just below the ceiling, wound to face down
    let lamp = quad(
        [[343.0, 548.7, 227.0], [343.0, 548.7, 332.0], [213.0, 548.7, 332.0], [213.0, 548.7, 227.0]],
        &light,
    );

    let short_block = block(
        [
            [[130.0, 165.0, 65.0], [82.0, 165.0, 225.0], [240.0, 165.0, 272.0], [290.0, 165.0, 114.0]],
            [[290.0, 0.0, 114.0], [290.0, 165.0, 114.0], [240.0, 165.0, 272.0], [240.0, 0.0, 272.0]],
            [[130.0, 0.0, 65.0], [130.0, 165.0, 65.0], [290.0, 165.0, 114.0], [290.0, 0.0, 114.0]],
            [[82.0, 0.0, 225.0], [82.0, 165.0, 225.0], [130.0, 165.0, 65.0], [130.0, 0.0, 65.0]],
            [[240.0, 0.0, 272.0], [240.0, 165.0, 272.0], [82.0, 165.0, 225.0], [82.0, 0.0, 225.0]],
        ],
        &white,
    );
    let tall_block = block(
        [
            [[423.0, 330.0, 247.0], [265.0, 330.0, 296.0], [314.0, 330.0, 456.0], [472.0, 330.0, 406.0]],
            [[423.0, 0.0, 247.0], [423.0, 330.0, 247.0], [472.0, 330.0, 406.0], [472.0, 0.0, 406.0]],
            [[472.0, 0.0, 406.0], [472.0, 330.0, 406.0], [314.0, 330.0, 456.0], [314.0, 0.0, 456.0]],
            [[314.0, 0.0, 456.0], [314.0, 330.0, 456.0], [265.0, 330.0, 296.0], [265.0, 0.0, 296.0]],
            [[265.0, 0.0, 296.0], [265.0, 330.0, 296.0], [423.0, 330.0, 247.0], [423.0, 0.0, 247.0]],
        ],
        &white,
    );

    builder
        .add(floor)
        .add(ceiling)
        .add(back)
        .add(right)
        .add(left)
        .add(short_block)
        .add(tall_block)
        .add(lamp)
}

/// Camera in front of the open side, looking straight in.
pub fn camera() -> Camera {
    Camera::new().with_position(
        Vec3::new(278.0, 273.0, -800.0),
        Vec3::new(278.0, 273.0, 0.0),
        Vec3::Y,
    )
}
