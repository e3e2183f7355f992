//! Criterion benchmarks for DevfileMapper::map()
//!
//! - Minimal: one container, one endpoint
//! - Multi-endpoint: one container, several public endpoints
//! - Multi-container: several containers, one marked primary

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use devmap_devfile::{Devfile, DevfileParser, YamlDevfileParser};
use devmap_mapper::{DevfileMapper, RequestMetadata, RoutePolicy};
use devmap_resources::openshift::GitSource;

// =============================================================================
// Fixtures
// =============================================================================

const MINIMAL: &str = r#"
schemaVersion: 2.2.0
components:
  - name: runtime
    container:
      image: node:18
      endpoints:
        - name: http
          targetPort: 3000
"#;

fn multi_endpoint(count: u16) -> String {
    let mut yaml = String::from(
        "schemaVersion: 2.2.0\ncomponents:\n  - name: runtime\n    container:\n      image: node:18\n      endpoints:\n",
    );
    for i in 0..count {
        yaml.push_str(&format!(
            "        - name: ep{i}\n          targetPort: {}\n",
            8000 + i
        ));
    }
    yaml
}

fn multi_container(count: usize) -> String {
    let mut yaml = String::from("schemaVersion: 2.2.0\ncomponents:\n");
    for i in 0..count {
        let primary = if i == 0 {
            "    attributes:\n      devmap.io/primary: true\n"
        } else {
            ""
        };
        yaml.push_str(&format!(
            "  - name: c{i}\n{primary}    container:\n      image: quay.io/acme/c{i}:1.0\n      memoryLimit: 512Mi\n      endpoints:\n        - name: c{i}-http\n          targetPort: {}\n",
            9000 + i
        ));
    }
    yaml
}

fn parse(yaml: &str) -> Devfile {
    YamlDevfileParser.parse(yaml).expect("benchmark devfile parses")
}

fn request() -> RequestMetadata {
    RequestMetadata {
        name: "bench".to_string(),
        namespace: "default".to_string(),
        labels: BTreeMap::from([("team".to_string(), "bench".to_string())]),
        pod_labels: BTreeMap::from([("app".to_string(), "bench".to_string())]),
        git: GitSource {
            url: "https://example/repo.git".to_string(),
            git_ref: "main".to_string(),
            context_dir: "/".to_string(),
        },
        ..Default::default()
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_minimal(c: &mut Criterion) {
    let devfile = parse(MINIMAL);
    let req = request();
    c.bench_function("map/minimal", |b| {
        b.iter(|| DevfileMapper::new(black_box(&devfile), black_box(&req)).map())
    });
}

fn bench_endpoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("map/endpoints");
    let req = request();
    for count in [1u16, 8, 32] {
        let devfile = parse(&multi_endpoint(count));
        for policy in [RoutePolicy::PerEndpoint, RoutePolicy::Single] {
            group.bench_with_input(
                BenchmarkId::new(policy.as_str(), count),
                &devfile,
                |b, devfile| {
                    b.iter(|| {
                        DevfileMapper::new(black_box(devfile), black_box(&req))
                            .with_route_policy(policy)
                            .map()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_containers(c: &mut Criterion) {
    let mut group = c.benchmark_group("map/containers");
    let req = request();
    for count in [2usize, 8] {
        let devfile = parse(&multi_container(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &devfile, |b, devfile| {
            b.iter(|| DevfileMapper::new(black_box(devfile), black_box(&req)).map())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_minimal, bench_endpoints, bench_containers);
criterion_main!(benches);
