use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use tokio::runtime::Runtime;
use uuid::Uuid;
use wolfshield_core::{
    ChainTail, ExpectedTail, OrganizationId, PropertyId, ResidentId, UnitId, UserId,
};
use wolfshield_infra::{InMemoryLedgerStore, LedgerEngine};
use wolfshield_ledger::{
    AccountingPeriod, Amount, LedgerEntry, NewLedgerEntry, TransactionType, verify_chain,
};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn draft(organization_id: OrganizationId) -> NewLedgerEntry {
    NewLedgerEntry {
        organization_id,
        property_id: PropertyId::new(),
        unit_id: UnitId::new(),
        tenant_id: Some(ResidentId::new()),
        transaction_type: TransactionType::Charge,
        amount: Amount::parse("1250.00").unwrap(),
        description: "Monthly rent".to_string(),
        accounting_period: AccountingPeriod::parse("2026-02").unwrap(),
        created_by: UserId::new(),
    }
}

fn sealed_chain(len: usize) -> Vec<LedgerEntry> {
    let org = OrganizationId::new();
    let mut tail = ExpectedTail::Genesis;
    let mut chain = Vec::with_capacity(len);
    for _ in 0..len {
        let entry = LedgerEntry::seal(draft(org), Uuid::now_v7(), Utc::now(), &tail);
        tail = ExpectedTail::Entry(ChainTail {
            sequence: entry.sequence,
            entry_hash: entry.entry_hash.clone(),
        });
        chain.push(entry);
    }
    chain
}

fn bench_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_seal");
    group.throughput(Throughput::Elements(1));
    let org = OrganizationId::new();

    group.bench_function("seal_genesis", |b| {
        b.iter(|| {
            black_box(LedgerEntry::seal(
                draft(org),
                Uuid::now_v7(),
                Utc::now(),
                &ExpectedTail::Genesis,
            ))
        });
    });

    group.finish();
}

fn bench_engine_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_append");
    group.throughput(Throughput::Elements(1));
    let rt = runtime();

    group.bench_function("append_in_memory", |b| {
        let engine = LedgerEngine::new(InMemoryLedgerStore::new());
        let org = OrganizationId::new();
        b.iter(|| {
            rt.block_on(async { black_box(engine.append(draft(org)).await.unwrap()) });
        });
    });

    group.finish();
}

fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_verification");

    for len in [10usize, 100, 1000, 10_000].iter() {
        group.throughput(Throughput::Elements(*len as u64));

        let chain = sealed_chain(*len);
        group.bench_with_input(BenchmarkId::new("verify_chain", len), &chain, |b, chain| {
            b.iter(|| black_box(verify_chain(chain)));
        });

        let rt = runtime();
        let engine = LedgerEngine::new(InMemoryLedgerStore::new());
        let org = OrganizationId::new();
        rt.block_on(async {
            for _ in 0..*len {
                engine.append(draft(org)).await.unwrap();
            }
        });
        group.bench_with_input(BenchmarkId::new("engine_verify", len), &org, |b, org| {
            b.iter(|| rt.block_on(async { black_box(engine.verify(*org).await.unwrap()) }));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_seal, bench_engine_append, bench_verification);
criterion_main!(benches);
