use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fyxed_core::{build_hierarchy, resolve_upline, CommissionCalculator, UserDirectory};
use fyxed_domain::{ComputedShares, Money, Sale, SaleStatus, User, UserRole};

/// One owner, `leaders` leaders, ten agents per leader
fn sample_users(leaders: usize) -> Vec<User> {
    let mut users = vec![User::new("owner", "Owner", UserRole::Owner, None)];
    for l in 0..leaders {
        let leader_id = format!("leader-{l}");
        users.push(User::new(
            leader_id.clone(),
            format!("Leader {l}"),
            UserRole::Leader,
            Some("owner".to_string()),
        ));
        for a in 0..10 {
            users.push(User::new(
                format!("agent-{l}-{a}"),
                format!("Agent {l}.{a}"),
                UserRole::Agent,
                Some(leader_id.clone()),
            ));
        }
    }
    users
}

fn sample_sales(users: &[User], per_user: usize, precomputed: bool) -> Vec<Sale> {
    let calculator = CommissionCalculator::default();
    let directory = UserDirectory::new(users);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();

    users
        .iter()
        .filter(|user| user.role == UserRole::Agent)
        .flat_map(|user| (0..per_user).map(move |n| (user, n)))
        .enumerate()
        .map(|(idx, (user, n))| {
            let amount = Money::from_minor(1_000 + (idx as i64 % 97) * 13);
            let computed = precomputed.then(|| {
                let upline = resolve_upline(&user.id, &directory).unwrap();
                let split = calculator.compute_for(amount, &upline).unwrap();
                ComputedShares::new(split, upline)
            });
            Sale {
                id: format!("sale-{idx}"),
                seller_id: user.id.clone(),
                amount,
                currency: "USD".to_string(),
                status: SaleStatus::Approved,
                created_at: start + Duration::minutes((idx * 7 + n) as i64),
                computed,
            }
        })
        .collect()
}

fn hierarchy_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy_aggregation");
    group.sample_size(20).measurement_time(std::time::Duration::from_secs(10));

    for leaders in [10, 100] {
        let users = sample_users(leaders);
        let stored = sample_sales(&users, 20, true);
        let derived = sample_sales(&users, 20, false);

        group.bench_with_input(BenchmarkId::new("precomputed", leaders), &leaders, |b, _| {
            b.iter(|| build_hierarchy(black_box(&users), black_box(&stored)));
        });

        group.bench_with_input(BenchmarkId::new("derived", leaders), &leaders, |b, _| {
            b.iter(|| build_hierarchy(black_box(&users), black_box(&derived)));
        });
    }

    group.finish();
}

criterion_group!(core_benchmarks, hierarchy_benchmark);
criterion_main!(core_benchmarks);
