use crate::renderer::Vertex;

/// Unit cube centered at the origin, one quad per face.
pub fn cube_mesh(half: f32) -> (Vec<Vertex>, Vec<u32>) {
    let h = half;
    #[rustfmt::skip]
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // (normal, u axis, v axis)
        ([ 0.0,  0.0,  1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([ 0.0,  0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([ 1.0,  0.0,  0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0,  0.0,  0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([ 0.0,  1.0,  0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([ 0.0, -1.0,  0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u_axis, v_axis) in faces {
        let base = vertices.len() as u32;
        for (du, dv, uv) in [
            (-1.0, -1.0, [0.0, 1.0]),
            (1.0, -1.0, [1.0, 1.0]),
            (1.0, 1.0, [1.0, 0.0]),
            (-1.0, 1.0, [0.0, 0.0]),
        ] {
            let position = [
                normal[0] * h + u_axis[0] * h * du + v_axis[0] * h * dv,
                normal[1] * h + u_axis[1] * h * du + v_axis[1] * h * dv,
                normal[2] * h + u_axis[2] * h * du + v_axis[2] * h * dv,
            ];
            vertices.push(Vertex::new(position, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// Flat quad in the XZ plane facing +Y, `half` units per side from center.
pub fn plane_mesh(half: f32) -> (Vec<Vertex>, Vec<u32>) {
    let vertices = vec![
        Vertex::new([-half, 0.0, -half], [0.0, 1.0, 0.0], [0.0, 0.0]),
        Vertex::new([-half, 0.0, half], [0.0, 1.0, 0.0], [0.0, 1.0]),
        Vertex::new([half, 0.0, half], [0.0, 1.0, 0.0], [1.0, 1.0]),
        Vertex::new([half, 0.0, -half], [0.0, 1.0, 0.0], [1.0, 0.0]),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (vertices, indices)
}
