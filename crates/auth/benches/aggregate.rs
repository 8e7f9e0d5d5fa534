use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rolegate_auth::{
    FlatAssignmentRecord, Permission, PermissionAggregator, PermissionType, Role,
};
use rolegate_core::{PermissionId, RoleId, UserId};

/// `roles` roles, each holding `per_role` permissions; half of every role's
/// permissions are shared with its neighbour so de-duplication has work to do.
fn records(roles: u64, per_role: u64) -> Vec<FlatAssignmentRecord> {
    let user = UserId::new("bench-user").expect("valid user id");
    let mut out = Vec::new();
    for r in 0..roles {
        let role = Role::new(RoleId::new(r), format!("role-{r}"), format!("Role {r}"));
        for p in 0..per_role {
            let id = r * per_role / 2 + p;
            let ty = if id % 3 == 0 { PermissionType::Menu } else { PermissionType::Api };
            let permission = Permission::new(PermissionId::new(id), format!("p{id}"), ty)
                .with_path(format!("auth_{id}"));
            out.push(FlatAssignmentRecord::join(&user, &role, &permission));
        }
    }
    out
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_api_permissions");

    for roles in [2_u64, 8, 32] {
        let rows = records(roles, 200);
        group.throughput(Throughput::Elements(rows.len() as u64));

        let sequential = PermissionAggregator::new().with_fan_out_threshold(usize::MAX);
        group.bench_with_input(BenchmarkId::new("sequential", roles), &rows, |b, rows| {
            b.iter(|| sequential.aggregate(black_box(rows), &PermissionType::Api))
        });

        let fan_out = PermissionAggregator::new().with_fan_out_threshold(0);
        group.bench_with_input(BenchmarkId::new("fan_out", roles), &rows, |b, rows| {
            b.iter(|| fan_out.aggregate(black_box(rows), &PermissionType::Api))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
