//! Static scene: ground, forest, trail, waypoint markers, vehicle and lights.
//!
//! Everything here uses plain-colour materials; the scene never depends on
//! external assets being present.

use bevy::light::light_consts::lux;
use bevy::prelude::*;
use rand::Rng;
use waypath_core::course::{CAMERA_START, VEHICLE_START};
use waypath_core::{CameraMode, Waypoint};

use crate::drive::{DriveCamera, DriveSession, VehicleBody};

/// Number of trees scattered around the trail.
const TREE_COUNT: usize = 50;

/// Trees are placed between these distances from the origin.
const TREE_RADIUS_MIN: f32 = 10.0;
const TREE_RADIUS_MAX: f32 = 90.0;

/// Minimum horizontal clearance between a tree and the trail.
const TREE_TRAIL_CLEARANCE: f32 = 4.0;

/// Attempts before giving up on finding clear ground for the forest.
const TREE_MAX_ATTEMPTS: usize = TREE_COUNT * 20;

/// Number of points used to draw the trail.
const TRAIL_DRAW_POINTS: usize = 200;

/// Side length of the square ground plane.
const GROUND_SIZE: f32 = 200.0;

/// Sky colour behind the scene.
const SKY_COLOR: u32 = 0x8A_B6_C1;

/// Plugin that builds the static scene and draws the trail.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(hex_color(SKY_COLOR)))
            .add_systems(Startup, setup_scene)
            .add_systems(Update, draw_trail);
    }
}

/// Sampled trail points for gizmo drawing.
#[derive(Resource)]
struct TrailPolyline(Vec<Vec3>);

/// Convert `0xRRGGBB` to a Bevy colour.
pub fn hex_color(rgb: u32) -> Color {
    let [_, r, g, b] = rgb.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

/// Build the scene around the session's trail and markers.
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    session: Res<DriveSession>,
) {
    let polyline = session.trail.polyline(TRAIL_DRAW_POINTS);

    // Ground.
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: hex_color(0x3A_7D_2C),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::default(),
    ));

    spawn_forest(&mut commands, &mut meshes, &mut materials, &polyline);

    for waypoint in session.driver.proximity().waypoints() {
        spawn_marker(&mut commands, &mut meshes, &mut materials, waypoint, &polyline);
    }

    spawn_vehicle(&mut commands, &mut meshes, &mut materials);

    // Camera, placed behind the vehicle until the first frame moves it.
    let rest_fov = session.driver.camera().state().fov;
    commands.spawn((
        Name::new("Drive Camera"),
        Camera3d::default(),
        Transform::from_translation(CAMERA_START).looking_at(VEHICLE_START, Vec3::Y),
        Projection::Perspective(PerspectiveProjection {
            fov: rest_fov.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..Default::default()
        }),
        DriveCamera,
    ));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            color: Color::WHITE,
            illuminance: lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        Name::new("Fill Light"),
        PointLight {
            color: hex_color(0xFF_FF_CC),
            range: 100.0,
            ..default()
        },
        Transform::from_xyz(0.0, 5.0, 0.0),
    ));

    commands.insert_resource(TrailPolyline(polyline));

    let mode = session.driver.camera().mode();
    if mode == CameraMode::Free {
        tracing::info!("Scene ready - free camera, move the mouse to look around");
    } else {
        tracing::info!("Scene ready - WASD or arrows to drive, C to change camera");
    }
}

/// Pick tree positions around the origin, keeping clear of the trail.
///
/// May return fewer than `count` positions if clear ground runs out.
fn scatter_trees(rng: &mut impl Rng, count: usize, trail: &[Vec3]) -> Vec<Vec3> {
    let mut trees = Vec::with_capacity(count);
    for _ in 0..TREE_MAX_ATTEMPTS {
        if trees.len() == count {
            break;
        }
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let radius = rng.random_range(TREE_RADIUS_MIN..TREE_RADIUS_MAX);
        let position = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        if distance_to_polyline(position, trail) >= TREE_TRAIL_CLEARANCE {
            trees.push(position);
        }
    }
    trees
}

/// Horizontal distance from `point` to the nearest vertex of `polyline`.
fn distance_to_polyline(point: Vec3, polyline: &[Vec3]) -> f32 {
    nearest_vertex(point, polyline).map_or(f32::INFINITY, |p| horizontal_distance(point, p))
}

fn nearest_vertex(point: Vec3, polyline: &[Vec3]) -> Option<Vec3> {
    polyline.iter().copied().min_by(|a, b| {
        horizontal_distance(point, *a).total_cmp(&horizontal_distance(point, *b))
    })
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

fn spawn_forest(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    trail: &[Vec3],
) {
    let mut rng = rand::rng();
    let trunk_mesh = meshes.add(Cylinder::new(0.3, 2.0));
    let crown_mesh = meshes.add(Cone {
        radius: 1.5,
        height: 3.0,
    });
    let trunk_material = materials.add(StandardMaterial {
        base_color: hex_color(0x8B_45_13),
        perceptual_roughness: 0.9,
        ..default()
    });
    let crown_material = materials.add(StandardMaterial {
        base_color: hex_color(0x2E_8B_57),
        perceptual_roughness: 0.8,
        ..default()
    });

    let trees = scatter_trees(&mut rng, TREE_COUNT, trail);
    if trees.len() < TREE_COUNT {
        tracing::warn!("Only found room for {} of {TREE_COUNT} trees", trees.len());
    }

    for position in trees {
        let scale = rng.random_range(0.8..1.3);
        commands
            .spawn((
                Name::new("Tree"),
                Transform::from_translation(position).with_scale(Vec3::splat(scale)),
                Visibility::default(),
            ))
            .with_children(|tree| {
                tree.spawn((
                    Mesh3d(trunk_mesh.clone()),
                    MeshMaterial3d(trunk_material.clone()),
                    Transform::from_xyz(0.0, 1.0, 0.0),
                ));
                tree.spawn((
                    Mesh3d(crown_mesh.clone()),
                    MeshMaterial3d(crown_material.clone()),
                    Transform::from_xyz(0.0, 3.5, 0.0),
                ));
            });
    }
}

/// A post with a coloured sign facing the trail.
fn spawn_marker(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    waypoint: &Waypoint,
    trail: &[Vec3],
) {
    let color = hex_color(waypoint.color);
    let sign_height = 2.2;
    let sign_center = waypoint.position + Vec3::Y * sign_height;
    let facing = nearest_vertex(waypoint.position, trail)
        .map_or(VEHICLE_START, |p| Vec3::new(p.x, sign_center.y, p.z));

    commands
        .spawn((
            Name::new(format!("Marker: {}", waypoint.label)),
            Transform::from_translation(waypoint.position),
            Visibility::default(),
        ))
        .with_children(|marker| {
            marker.spawn((
                Mesh3d(meshes.add(Cylinder::new(0.1, sign_height))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: hex_color(0x5C_40_33),
                    ..default()
                })),
                Transform::from_xyz(0.0, sign_height * 0.5, 0.0),
            ));
            // Local transform of a sign that faces `facing` in world space.
            let sign_transform = Transform::from_translation(Vec3::Y * sign_height)
                .looking_at(facing - waypoint.position, Vec3::Y);
            marker.spawn((
                Mesh3d(meshes.add(Cuboid::new(1.8, 0.8, 0.1))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: color,
                    emissive: color.to_linear() * 0.3,
                    ..default()
                })),
                sign_transform,
            ));
        });
}

/// The carriage: a body on four wheels with a lantern, facing +Z.
fn spawn_vehicle(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let wood = materials.add(StandardMaterial {
        base_color: hex_color(0x8B_45_13),
        perceptual_roughness: 0.8,
        ..default()
    });
    let trim = materials.add(StandardMaterial {
        base_color: hex_color(0x65_43_21),
        perceptual_roughness: 0.7,
        ..default()
    });
    let wheel_material = materials.add(StandardMaterial {
        base_color: hex_color(0x33_33_33),
        perceptual_roughness: 0.6,
        ..default()
    });
    let wheel_mesh = meshes.add(Cylinder::new(0.4, 0.15));
    let body_mesh = meshes.add(Cuboid::new(1.2, 0.8, 2.2));
    let roof_mesh = meshes.add(Cuboid::new(1.4, 0.1, 2.4));

    commands
        .spawn((
            Name::new("Vehicle"),
            VehicleBody,
            Transform::from_translation(VEHICLE_START),
            Visibility::default(),
        ))
        .with_children(|vehicle| {
            vehicle.spawn((
                Mesh3d(body_mesh),
                MeshMaterial3d(wood),
                Transform::from_xyz(0.0, 0.9, 0.0),
            ));
            vehicle.spawn((
                Mesh3d(roof_mesh),
                MeshMaterial3d(trim),
                Transform::from_xyz(0.0, 1.35, 0.0),
            ));
            // Wheels sit on the axles, rotated so their axis points along X.
            for (x, z) in [(-0.7, 0.9), (0.7, 0.9), (-0.7, -0.9), (0.7, -0.9)] {
                vehicle.spawn((
                    Mesh3d(wheel_mesh.clone()),
                    MeshMaterial3d(wheel_material.clone()),
                    Transform::from_xyz(x, 0.4, z)
                        .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
                ));
            }
            vehicle.spawn((
                Name::new("Lantern"),
                PointLight {
                    color: hex_color(0xFF_CC_66),
                    intensity: 20_000.0,
                    range: 6.0,
                    ..default()
                },
                Transform::from_xyz(0.0, 1.6, 1.2),
            ));
        });
}

/// Draw the trail as a line strip just above the ground.
fn draw_trail(mut gizmos: Gizmos, polyline: Option<Res<TrailPolyline>>) {
    let Some(polyline) = polyline else {
        return;
    };
    gizmos.linestrip(polyline.0.iter().copied(), hex_color(0x8B_5A_2B));
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use waypath_core::TrailPath;

    use super::*;

    #[test]
    fn test_hex_color_channels() {
        assert_eq!(hex_color(0xFF_63_47), Color::srgb_u8(0xFF, 0x63, 0x47));
    }

    #[test]
    fn test_trees_clear_of_trail() {
        let trail = TrailPath::forest_trail().polyline(TRAIL_DRAW_POINTS);
        let mut rng = StdRng::seed_from_u64(7);
        let trees = scatter_trees(&mut rng, TREE_COUNT, &trail);

        assert_eq!(trees.len(), TREE_COUNT);
        for tree in trees {
            let radius = Vec2::new(tree.x, tree.z).length();
            assert!((TREE_RADIUS_MIN..TREE_RADIUS_MAX).contains(&radius));
            assert!(distance_to_polyline(tree, &trail) >= TREE_TRAIL_CLEARANCE);
        }
    }

    #[test]
    fn test_empty_polyline_is_infinitely_far() {
        assert!(distance_to_polyline(Vec3::ZERO, &[]).is_infinite());
    }
}
