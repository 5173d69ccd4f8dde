//! Same-month region detection: 4-connected flood fill over the grid.

use crate::grid::{Grid, HEIGHT, Pos, WIDTH};

/// Smallest region that is removed.
pub const MIN_GROUP: usize = 3;

const NEIGHBOURS_4: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Every maximal 4-connected same-month region of at least [`MIN_GROUP`] cards,
/// in row-major order of each region's first-scanned cell.
pub fn find_groups(grid: &Grid) -> Vec<Vec<Pos>> {
    let mut visited = [[false; WIDTH]; HEIGHT];
    let mut groups = Vec::new();

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            if visited[y][x] {
                continue;
            }
            let Some(seed) = grid.get(x as i32, y as i32) else {
                continue;
            };
            let month = seed.month();
            let mut region = Vec::new();
            let mut stack = vec![(x, y)];
            visited[y][x] = true;

            while let Some((cx, cy)) = stack.pop() {
                region.push((cx, cy));
                for (dx, dy) in NEIGHBOURS_4 {
                    let nx = cx as i32 + dx;
                    let ny = cy as i32 + dy;
                    if !grid.is_inside(nx, ny) {
                        continue;
                    }
                    let (ux, uy) = (nx as usize, ny as usize);
                    if visited[uy][ux] {
                        continue;
                    }
                    if grid.get(nx, ny).is_some_and(|c| c.month() == month) {
                        visited[uy][ux] = true;
                        stack.push((ux, uy));
                    }
                }
            }

            if region.len() >= MIN_GROUP {
                region.sort_unstable_by_key(|&(px, py)| (py, px));
                groups.push(region);
            }
        }
    }
    groups
}
