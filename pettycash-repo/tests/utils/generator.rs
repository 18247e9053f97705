use chrono::{Duration, NaiveDate};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use pettycash_repo::transaction_repo::{NewTransaction, TransactionType};
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

trait Generator<T> {
    fn gen(&mut self) -> T;
}

struct Predefined<T> {
    values: Vec<T>,
    current_pos: usize,
}

impl<T> Predefined<T> {
    fn boxed(values: Vec<T>) -> Box<Predefined<T>> {
        Box::new(Predefined {
            values,
            current_pos: 0,
        })
    }
}

impl<T: Clone> Generator<T> for Predefined<T> {
    fn gen(&mut self) -> T {
        let v = self.values[self.current_pos].clone();
        self.current_pos += 1;
        v
    }
}

struct RandomSample<T> {
    values: Vec<T>,
}

impl<T> RandomSample<T> {
    fn boxed(values: Vec<T>) -> Box<RandomSample<T>> {
        Box::new(RandomSample { values })
    }
}

impl<T: Clone> Generator<T> for RandomSample<T> {
    fn gen(&mut self) -> T {
        self.values.choose(&mut rand::thread_rng()).unwrap().clone()
    }
}

struct FakeGenerator<F> {
    fake: F,
}

impl<F> FakeGenerator<F> {
    fn boxed(fake: F) -> Box<FakeGenerator<F>> {
        Box::new(FakeGenerator { fake })
    }
}

impl<T: fake::Dummy<F>, F> Generator<T> for FakeGenerator<F> {
    fn gen(&mut self) -> T {
        self.fake.fake()
    }
}

struct FakeUsedBy;

impl Generator<Option<String>> for FakeUsedBy {
    fn gen(&mut self) -> Option<String> {
        if (0..4).fake::<u8>() == 0 {
            None
        } else {
            Some(Name().fake())
        }
    }
}

/// Positive amounts with two decimal places.
struct FakeAmount;

impl Generator<Decimal> for FakeAmount {
    fn gen(&mut self) -> Decimal {
        Decimal::new((1..1_000_000i64).fake(), 2)
    }
}

/// Dates within two years from the start of 2024.
struct FakeDate;

impl Generator<NaiveDate> for FakeDate {
    fn gen(&mut self) -> NaiveDate {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        start + Duration::days((0..730).fake())
    }
}

#[allow(dead_code)]
pub struct NewTransactionGenerator {
    category_id: i32,
    transaction_type: TransactionType,
    desc_gen: Box<dyn Generator<String>>,
    used_by_gen: Box<dyn Generator<Option<String>>>,
    date_gen: Box<dyn Generator<NaiveDate>>,
    amnt_gen: Box<dyn Generator<Decimal>>,
}

#[allow(dead_code)]
impl NewTransactionGenerator {
    pub fn new(category_id: i32, transaction_type: TransactionType) -> NewTransactionGenerator {
        NewTransactionGenerator {
            category_id,
            transaction_type,
            desc_gen: FakeGenerator::boxed(Sentence(3..8)),
            used_by_gen: Box::new(FakeUsedBy),
            date_gen: Box::new(FakeDate),
            amnt_gen: Box::new(FakeAmount),
        }
    }

    pub fn with_used_by(mut self, used_by: Vec<&str>) -> NewTransactionGenerator {
        let used_by = used_by.into_iter().map(|u| Some(u.to_string())).collect();
        self.used_by_gen = RandomSample::boxed(used_by);
        self
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> NewTransactionGenerator {
        self.date_gen = Predefined::boxed(dates);
        self
    }

    pub fn with_amounts(mut self, amounts: Vec<Decimal>) -> NewTransactionGenerator {
        self.amnt_gen = Predefined::boxed(amounts);
        self
    }

    pub fn generate(&mut self) -> NewTransaction {
        NewTransaction::new(
            self.category_id,
            self.desc_gen.gen(),
            self.used_by_gen.gen(),
            self.transaction_type,
            self.date_gen.gen(),
            self.amnt_gen.gen(),
            None,
        )
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewTransaction> {
        let mut vec = Vec::with_capacity(count);
        for _ in 0..count {
            vec.push(self.generate())
        }
        vec
    }
}
