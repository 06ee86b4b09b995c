//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{
    BodyPartId, CategoryId, ConditionGroupId, ConditionId, CustomEmployeeCodeId, DiscountId, EmployeeId,
    FilterId, IllnessId, InsuranceId, ItemGroupId, ItemId, PeriodType, PriceRecordId, ProvinceId, RestrictionId,
    SubCategoryId, ValidityWindow,
};
use domain_pricing::{
    CecItemDiscount, ConditionFilter, ConditionGroup, ConditionRestriction, DiscountTerms, Employee,
    EmployeeSpecialDiscount, FilterOperator, FilterType, Gender, GroupMember, InsuranceRecord, InvoiceStatus, Item,
    PriceCondition, PriceRecord, RestrictionType, SetItemDiscount, UsageRecord,
};
use infra_store::{InMemoryStore, PricingSnapshot};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::fixtures::{DateFixtures, IdFixtures, MoneyFixtures};

/// Builder for catalog items
pub struct ItemBuilder {
    item: Item,
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemBuilder {
    /// Creates an eligible drug item in the fixture category
    pub fn new() -> Self {
        let mut item = Item::new(IdFixtures::item());
        item.code = "DRG-001".to_string();
        item.name = "Amoxicillin 500mg".to_string();
        item.item_type = "drug".to_string();
        item.category_id = Some(IdFixtures::category());
        Self { item }
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.item.id = id;
        self
    }

    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.item.category_id = Some(category);
        self
    }

    pub fn without_category(mut self) -> Self {
        self.item.category_id = None;
        self
    }

    pub fn with_sub_category(mut self, sub_category: SubCategoryId) -> Self {
        self.item.sub_category_id = Some(sub_category);
        self
    }

    pub fn with_group(mut self, group: ItemGroupId) -> Self {
        self.item.group_id = Some(group);
        self
    }

    pub fn with_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item.item_type = item_type.into();
        self
    }

    /// Marks the item as never covered
    pub fn not_eligible(mut self) -> Self {
        self.item.is_coverage_eligible = false;
        self
    }

    pub fn otc(mut self) -> Self {
        self.item.is_otc = true;
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}

/// Builder for insured persons
pub struct EmployeeBuilder {
    employee: Employee,
}

impl Default for EmployeeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeBuilder {
    /// Creates an adult principal insured since the start of the fixture year
    pub fn new() -> Self {
        let mut employee = Employee::new(IdFixtures::employee());
        employee.birth_date = Some(DateFixtures::adult_birth_date());
        employee.gender = Some(Gender::Female);
        employee.status = Some("active".to_string());
        employee.province_id = Some(IdFixtures::province());
        employee.relation_type = Some("self".to_string());
        employee.is_head_of_family = true;
        employee.employment_date = Some(DateFixtures::employment_date());
        employee.active_insurance = Some(InsuranceRecord {
            id: InsuranceId::new(1),
            start_date: DateFixtures::year_start(),
            end_date: None,
        });
        Self { employee }
    }

    pub fn with_id(mut self, id: EmployeeId) -> Self {
        self.employee.id = id;
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.employee.birth_date = Some(birth_date);
        self
    }

    pub fn without_birth_date(mut self) -> Self {
        self.employee.birth_date = None;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.employee.gender = Some(gender);
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.employee.relation_type = Some(relation.into());
        self.employee.is_head_of_family = false;
        self
    }

    pub fn without_relation(mut self) -> Self {
        self.employee.relation_type = None;
        self
    }

    pub fn with_province(mut self, province: ProvinceId) -> Self {
        self.employee.province_id = Some(province);
        self
    }

    pub fn with_custom_code(mut self, code: CustomEmployeeCodeId) -> Self {
        self.employee.custom_employee_code_id = Some(code);
        self
    }

    pub fn with_illness(mut self, illness: IllnessId) -> Self {
        self.employee.active_illness_ids.insert(illness);
        self
    }

    /// Sets the active insurance start date
    pub fn insured_since(mut self, start_date: NaiveDate) -> Self {
        self.employee.active_insurance = Some(InsuranceRecord {
            id: InsuranceId::new(1),
            start_date,
            end_date: None,
        });
        self
    }

    pub fn uninsured(mut self) -> Self {
        self.employee.active_insurance = None;
        self
    }

    pub fn build(self) -> Employee {
        self.employee
    }
}

/// Builder for coverage conditions
pub struct ConditionBuilder {
    condition: PriceCondition,
}

impl ConditionBuilder {
    /// Creates an unscoped, active condition with the given coverage
    pub fn new(coverage_percentage: Decimal) -> Self {
        let mut condition = PriceCondition::new(IdFixtures::condition(), coverage_percentage);
        condition.code = "GEN".to_string();
        condition.name = "General coverage".to_string();
        Self { condition }
    }

    pub fn with_id(mut self, id: ConditionId) -> Self {
        self.condition.id = id;
        self
    }

    pub fn named(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.condition.code = code.into();
        self.condition.name = name.into();
        self
    }

    pub fn for_item(mut self, item: ItemId) -> Self {
        self.condition.item_id = Some(item);
        self
    }

    pub fn for_category(mut self, category: CategoryId) -> Self {
        self.condition.category_id = Some(category);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.condition.priority = priority;
        self
    }

    pub fn with_ages(mut self, min_age: Option<u32>, max_age: Option<u32>) -> Self {
        self.condition.min_age = min_age;
        self.condition.max_age = max_age;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.condition.gender = Some(gender);
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.condition.relation_type = Some(relation.into());
        self
    }

    pub fn valid_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.condition.validity = ValidityWindow {
            effective_from: from,
            effective_to: to,
        };
        self
    }

    pub fn inactive(mut self) -> Self {
        self.condition.is_active = false;
        self
    }

    pub fn with_fixed_patient_share(mut self, per_unit: Decimal) -> Self {
        self.condition.fixed_patient_share = Some(per_unit);
        self
    }

    pub fn with_max_covered_amount(mut self, per_unit: Decimal) -> Self {
        self.condition.max_covered_amount = Some(per_unit);
        self
    }

    pub fn with_period_cap(mut self, max_per_period: u32, period: PeriodType) -> Self {
        self.condition.max_per_period = Some(max_per_period);
        self.condition.period_type = Some(period);
        self
    }

    pub fn with_prescription_cap(mut self, max_quantity: u32) -> Self {
        self.condition.max_quantity_per_prescription = Some(max_quantity);
        self
    }

    pub fn with_waiting_days(mut self, days: u32) -> Self {
        self.condition.waiting_days = days;
        self
    }

    pub fn with_filter(mut self, filter_type: FilterType, operator: FilterOperator, values: Vec<i64>) -> Self {
        let id = FilterId::new(self.condition.filters.len() as i64 + 1);
        self.condition.filters.push(ConditionFilter {
            id,
            filter_type,
            operator,
            values,
            is_active: true,
        });
        self
    }

    pub fn with_restriction(mut self, restriction: ConditionRestriction) -> Self {
        self.condition.restrictions.push(restriction);
        self
    }

    pub fn with_rule(mut self, expression: Value) -> Self {
        self.condition.rule_expression = Some(expression);
        self
    }

    pub fn build(self) -> PriceCondition {
        self.condition
    }
}

/// Helpers for building condition restrictions
pub struct RestrictionBuilder;

impl RestrictionBuilder {
    fn base(id: i64, restriction_type: RestrictionType) -> ConditionRestriction {
        ConditionRestriction {
            id: RestrictionId::new(id),
            restriction_type,
            conflict_item_id: None,
            max_count: None,
            period_type: None,
            required_illness_ids: Vec::new(),
            is_active: true,
        }
    }

    pub fn conflict_item(id: i64, item: ItemId) -> ConditionRestriction {
        ConditionRestriction {
            conflict_item_id: Some(item),
            ..Self::base(id, RestrictionType::ConflictItem)
        }
    }

    pub fn max_per_body_part(id: i64, max_count: u32, period: PeriodType) -> ConditionRestriction {
        ConditionRestriction {
            max_count: Some(max_count),
            period_type: Some(period),
            ..Self::base(id, RestrictionType::MaxPerBodyPart)
        }
    }

    pub fn required_diagnosis(id: i64, illnesses: Vec<IllnessId>) -> ConditionRestriction {
        ConditionRestriction {
            required_illness_ids: illnesses,
            ..Self::base(id, RestrictionType::RequiredDiagnosis)
        }
    }

    pub fn max_total_usage(id: i64, max_count: u32) -> ConditionRestriction {
        ConditionRestriction {
            max_count: Some(max_count),
            ..Self::base(id, RestrictionType::MaxTotalUsage)
        }
    }
}

/// Builder for historical usage
pub struct UsageBuilder {
    record: UsageRecord,
}

impl UsageBuilder {
    /// A paid line for the fixture employee, dated earlier in the fixture year
    pub fn new(item: ItemId, quantity: u32) -> Self {
        Self {
            record: UsageRecord {
                invoice_id: IdFixtures::invoice(),
                employee_id: IdFixtures::employee(),
                item_id: item,
                body_part_id: None,
                quantity,
                insurance_share: Decimal::ZERO,
                invoice_date: DateFixtures::date(2024, 3, 1),
                status: InvoiceStatus::Paid,
            },
        }
    }

    pub fn for_employee(mut self, employee: EmployeeId) -> Self {
        self.record.employee_id = employee;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.record.invoice_date = date;
        self
    }

    pub fn with_body_part(mut self, body_part: BodyPartId) -> Self {
        self.record.body_part_id = Some(body_part);
        self
    }

    pub fn with_insurance_share(mut self, amount: Decimal) -> Self {
        self.record.insurance_share = amount;
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.record.status = status;
        self
    }

    pub fn build(self) -> UsageRecord {
        self.record
    }
}

/// Builder for discount terms
pub struct DiscountBuilder;

impl DiscountBuilder {
    pub fn employee_special(id: i64, employee: EmployeeId, percentage: Decimal) -> EmployeeSpecialDiscount {
        EmployeeSpecialDiscount {
            employee_id: employee,
            terms: DiscountTerms::new(DiscountId::new(id), percentage),
        }
    }

    pub fn cec_item(id: i64, code: CustomEmployeeCodeId, item: Option<ItemId>, percentage: Decimal) -> CecItemDiscount {
        CecItemDiscount {
            custom_employee_code_id: code,
            item_id: item,
            category_id: None,
            terms: DiscountTerms::new(DiscountId::new(id), percentage),
        }
    }

    pub fn set_item(id: i64, item: Option<ItemId>, min_quantity: u32, percentage: Decimal) -> SetItemDiscount {
        SetItemDiscount {
            item_id: item,
            category_id: None,
            group_id: None,
            min_quantity,
            terms: DiscountTerms::new(DiscountId::new(id), percentage),
        }
    }
}

/// Builder for condition groups
pub struct GroupBuilder {
    group: ConditionGroup,
}

impl GroupBuilder {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            group: ConditionGroup {
                id: ConditionGroupId::new(id),
                name: name.into(),
                members: Vec::new(),
                max_per_period: None,
                max_total_amount: None,
                period_type: None,
                is_active: true,
            },
        }
    }

    pub fn with_item(mut self, item: ItemId) -> Self {
        self.group.members.push(GroupMember::Item(item));
        self
    }

    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.group.members.push(GroupMember::Category(category));
        self
    }

    pub fn with_max_quantity(mut self, max: u32) -> Self {
        self.group.max_per_period = Some(max);
        self
    }

    pub fn with_max_amount(mut self, max: Decimal) -> Self {
        self.group.max_total_amount = Some(max);
        self
    }

    pub fn with_period(mut self, period: PeriodType) -> Self {
        self.group.period_type = Some(period);
        self
    }

    pub fn build(self) -> ConditionGroup {
        self.group
    }
}

/// Builder assembling a store from its parts
#[derive(Default)]
pub struct StoreBuilder {
    snapshot: PricingSnapshot,
    next_price_id: i64,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item priced at the fixture unit price
    pub fn with_priced_item(self, item: Item) -> Self {
        self.with_item_at(item, MoneyFixtures::unit_price())
    }

    /// Adds an item with an unbounded price record
    pub fn with_item_at(mut self, item: Item, price: Decimal) -> Self {
        let item_id = item.id;
        self.snapshot.items.push(item);
        let record = PriceRecordBuilder::new(item_id, price).build_with_id(&mut self.next_price_id);
        self.with_price_record(record)
    }

    /// Adds an item with no price record
    pub fn with_unpriced_item(mut self, item: Item) -> Self {
        self.snapshot.items.push(item);
        self
    }

    pub fn with_price_record(mut self, record: PriceRecord) -> Self {
        self.next_price_id = self.next_price_id.max(record.id.value());
        self.snapshot.price_records.push(record);
        self
    }

    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.snapshot.employees.push(employee);
        self
    }

    pub fn with_condition(mut self, condition: PriceCondition) -> Self {
        self.snapshot.conditions.push(condition);
        self
    }

    pub fn with_group(mut self, group: ConditionGroup) -> Self {
        self.snapshot.groups.push(group);
        self
    }

    pub fn with_employee_discount(mut self, discount: EmployeeSpecialDiscount) -> Self {
        self.snapshot.employee_special_discounts.push(discount);
        self
    }

    pub fn with_cec_discount(mut self, discount: CecItemDiscount) -> Self {
        self.snapshot.cec_item_discounts.push(discount);
        self
    }

    pub fn with_set_discount(mut self, discount: SetItemDiscount) -> Self {
        self.snapshot.set_item_discounts.push(discount);
        self
    }

    pub fn with_usage(mut self, record: UsageRecord) -> Self {
        self.snapshot.usage_records.push(record);
        self
    }

    /// Builds the store, panicking on an inconsistent snapshot
    pub fn build(self) -> InMemoryStore {
        InMemoryStore::from_snapshot(self.snapshot).expect("test snapshot should be consistent")
    }
}

/// Builder for price records
pub struct PriceRecordBuilder {
    record: PriceRecord,
}

impl PriceRecordBuilder {
    pub fn new(item: ItemId, price: Decimal) -> Self {
        Self {
            record: PriceRecord {
                id: IdFixtures::price_record(),
                item_id: item,
                price,
                default_insurance_percentage: Decimal::ZERO,
                default_patient_percentage: Decimal::ONE_HUNDRED,
                is_active: true,
                validity: ValidityWindow::unbounded(),
            },
        }
    }

    pub fn with_id(mut self, id: PriceRecordId) -> Self {
        self.record.id = id;
        self
    }

    pub fn with_default_split(mut self, insurance: Decimal, patient: Decimal) -> Self {
        self.record.default_insurance_percentage = insurance;
        self.record.default_patient_percentage = patient;
        self
    }

    pub fn effective_from(mut self, from: NaiveDate) -> Self {
        self.record.validity.effective_from = Some(from);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.record.is_active = false;
        self
    }

    pub fn build(self) -> PriceRecord {
        self.record
    }

    fn build_with_id(mut self, counter: &mut i64) -> PriceRecord {
        *counter += 1;
        self.record.id = PriceRecordId::new(*counter);
        self.record
    }
}
