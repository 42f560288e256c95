use criterion::{black_box, criterion_group, criterion_main, Criterion};
use propconf::*;

fn criterion_benchmark(c: &mut Criterion) {
    let conf = Configuration::builder()
        .with_property_source(MapPropertySource::new("first").set("hello", ""))
        .with_property_source(
            MapPropertySource::new("second")
                .set("hello", "world")
                .set("port", "8080")
                .set("url", "http://${hello}:${port}")
                .set("nested", "${key-${hello}}")
                .set("key-world", "deep"),
        )
        .build_configuration();

    c.bench_function("raw", |b| b.iter(|| conf.get_raw_value(black_box("hello"))));

    c.bench_function("string", |b| {
        b.iter(|| conf.get_value::<String>(black_box("hello")))
    });

    c.bench_function("missing", |b| {
        b.iter(|| conf.get_optional_value::<String>(black_box("world")))
    });

    c.bench_function("substitute", |b| {
        b.iter(|| conf.get_value::<i32>(black_box("world")))
    });

    c.bench_function("placeholder", |b| {
        b.iter(|| conf.get_value::<String>(black_box("url")))
    });

    c.bench_function("nested", |b| {
        b.iter(|| conf.get_resolved_value(black_box("nested")))
    });

    let template = "${hello}/${port}/${missing}/${key-${hello}}";
    c.bench_function("standard_resolver", |b| {
        b.iter(|| conf.resolve_placeholders(black_box(template)))
    });

    let bound = AccessorContract::new("Bench")
        .with(Accessor::<u16>::value("getPort"))
        .with(Accessor::<String>::optional("getUrl"))
        .bind(
            Configuration::builder()
                .with_property_source(
                    MapPropertySource::new("m")
                        .set("port", "8080")
                        .set("url", "http://localhost:${port}"),
                )
                .build_configuration(),
        )
        .unwrap();
    c.bench_function("invoke", |b| {
        b.iter(|| bound.invoke::<u16>(black_box("getPort")))
    });
    c.bench_function("invoke_optional", |b| {
        b.iter(|| bound.invoke_optional::<String>(black_box("getUrl")))
    });

    let regex = Configuration::builder()
        .with_property_source(MapPropertySource::new("m").set("hello", "world"))
        .with_resolver(RegexVariableResolver)
        .build_configuration();
    c.bench_function("regex_resolver", |b| {
        b.iter(|| regex.resolve_placeholders(black_box(template)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
