// src/services/invoice_service.rs

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, InvoiceRepository, JobOrderRepository, ProductRepository},
    models::{
        invoice::{Branch, InvoiceDetail, InvoiceStatus, Payment},
        job_order::JobOrderStatus,
        product::Product,
    },
};

// ---
// Entradas da venda (já validadas no handler)
// ---

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub branch: Branch,
    pub customer: CustomerInput,
    pub items: Vec<NewInvoiceItem>,
    pub discount_amount: Decimal,
    pub down_payment: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInvoiceItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub discount: Decimal,
    pub prescription: Option<Prescription>,
}

#[derive(Debug, Clone, Default)]
pub struct Prescription {
    pub sph: Option<Decimal>,
    pub cyl: Option<Decimal>,
    pub axis: Option<Decimal>,
    pub add_power: Option<Decimal>,
    pub mpd: Option<Decimal>,
}

impl Prescription {
    // Convenção de sinal da ótica: SPH fica como digitado, CYL é sempre
    // negativo e ADD é sempre positivo. Normalizamos antes de persistir
    // para que banco, tela e PDF contem a mesma história.
    pub fn normalized(&self) -> Prescription {
        Prescription {
            sph: self.sph,
            cyl: self.cyl.map(|c| -c.abs()),
            axis: self.axis,
            add_power: self.add_power.map(|a| a.abs()),
            mpd: self.mpd,
        }
    }
}

// ---
// Numeração: {PREFIXO}{YYMM}{seq:03}
// ---

fn month_tag(date: NaiveDate) -> String {
    date.format("%y%m").to_string()
}

// Avança a sequência a partir do último número emitido no mês.
// Sem predecessor (ou número ilegível) recomeça em 1; 999 dá a volta.
fn next_sequence(last_number: Option<&str>) -> u32 {
    let parsed = last_number
        .and_then(|n| n.get(n.len().saturating_sub(3)..))
        .and_then(|s| s.parse::<u32>().ok());

    match parsed {
        Some(seq) if seq >= 999 => 1,
        Some(seq) => seq + 1,
        None => 1,
    }
}

fn compose_invoice_number(branch: Branch, date: NaiveDate, seq: u32) -> String {
    format!("{}{}{:03}", branch.prefix(), month_tag(date), seq)
}

// ---
// Totais
// ---

#[derive(Debug, PartialEq)]
pub struct InvoiceTotals {
    pub total_amount: Decimal,
    pub grand_total: Decimal,
    pub remaining_balance: Decimal,
    pub status: InvoiceStatus,
}

// Invariantes da fatura:
//   grand_total = total_amount - discount_amount
//   remaining_balance = grand_total - down_payment
pub fn compute_totals(
    items: &[NewInvoiceItem],
    discount_amount: Decimal,
    down_payment: Decimal,
) -> InvoiceTotals {
    let total_amount: Decimal = items
        .iter()
        .map(|i| Decimal::from(i.quantity) * i.price - i.discount)
        .sum();

    let grand_total = total_amount - discount_amount;
    let remaining_balance = grand_total - down_payment;

    let status = if remaining_balance <= Decimal::ZERO {
        InvoiceStatus::Paid
    } else if down_payment > Decimal::ZERO {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Pending
    };

    InvoiceTotals {
        total_amount,
        grand_total,
        remaining_balance,
        status,
    }
}

// Confere a disponibilidade contra os saldos já travados pelo FOR UPDATE.
// Linhas repetidas do mesmo produto contam acumuladas contra o mesmo
// saldo; produtos sem controle de estoque passam direto.
fn check_stock(items: &[NewInvoiceItem], products: &[Product]) -> Result<(), AppError> {
    let mut requested: HashMap<Uuid, i32> = HashMap::new();

    for (line, product) in items.iter().zip(products) {
        if !product.track_inventory {
            continue;
        }

        let total = requested.entry(product.id).or_insert(0);
        *total += line.quantity;

        if *total > product.stock_qty {
            return Err(AppError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock_qty,
                requested: *total,
            });
        }
    }

    Ok(())
}

// ---
// O Serviço
// ---

#[derive(Clone)]
pub struct InvoiceService {
    pool: PgPool,
    invoice_repo: InvoiceRepository,
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
    job_order_repo: JobOrderRepository,
}

impl InvoiceService {
    pub fn new(
        pool: PgPool,
        invoice_repo: InvoiceRepository,
        product_repo: ProductRepository,
        customer_repo: CustomerRepository,
        job_order_repo: JobOrderRepository,
    ) -> Self {
        Self {
            pool,
            invoice_repo,
            product_repo,
            customer_repo,
            job_order_repo,
        }
    }

    // Aloca o próximo número dentro da transação da venda. O advisory
    // lock por (filial, mês) serializa emissões concorrentes: duas vendas
    // simultâneas na mesma filial nunca tiram o mesmo número.
    async fn allocate_invoice_number(
        &self,
        conn: &mut PgConnection,
        branch: Branch,
        date: NaiveDate,
    ) -> Result<String, AppError> {
        let month_prefix = format!("{}{}", branch.prefix(), month_tag(date));

        self.invoice_repo
            .lock_number_scope(&mut *conn, &month_prefix)
            .await?;

        let last = self
            .invoice_repo
            .find_last_number(&mut *conn, branch, &month_prefix)
            .await?;

        if let Some(ref n) = last {
            if n.get(n.len().saturating_sub(3)..)
                .and_then(|s| s.parse::<u32>().ok())
                .is_none()
            {
                tracing::warn!(
                    "Número de fatura ilegível '{}', recomeçando a sequência em 1",
                    n
                );
            }
        }

        let seq = next_sequence(last.as_deref());
        Ok(compose_invoice_number(branch, date, seq))
    }

    // A venda inteira em UMA transação: upsert do cliente, validação de
    // estoque com lock de linha, numeração, fatura + itens, baixa de
    // estoque e a ordem de serviço inicial das lentes. Qualquer erro
    // desfaz tudo: nenhuma fatura órfã, nenhum estoque baixado à toa.
    pub async fn create_invoice(
        &self,
        author: &str,
        created_by: Option<Uuid>,
        input: NewInvoice,
    ) -> Result<InvoiceDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Cliente: o telefone identifica; última gravação vence.
        let customer = self
            .customer_repo
            .upsert_by_phone(
                &mut *tx,
                &input.customer.name,
                &input.customer.phone,
                input.customer.email.as_deref(),
                input.customer.birth_date,
                input.customer.address.as_deref(),
            )
            .await?;

        // 2. Valida estoque ANTES de gravar qualquer coisa. FOR UPDATE
        // trava as linhas dos produtos até o commit.
        let mut resolved = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product = self
                .product_repo
                .find_for_update(&mut *tx, line.product_id)
                .await?
                .ok_or_else(|| {
                    AppError::ResourceNotFound(format!("Produto {}", line.product_id))
                })?;
            resolved.push(product);
        }
        check_stock(&input.items, &resolved)?;

        // 3. Número sequencial da filial
        let today = Utc::now().date_naive();
        let invoice_number = self
            .allocate_invoice_number(&mut tx, input.branch, today)
            .await?;

        // 4. Totais
        let totals = compute_totals(&input.items, input.discount_amount, input.down_payment);

        // 5. Cabeçalho
        let invoice = self
            .invoice_repo
            .insert_invoice(
                &mut *tx,
                &invoice_number,
                input.branch,
                Some(customer.id),
                &customer.name,
                &customer.phone,
                customer.address.as_deref(),
                totals.total_amount,
                input.discount_amount,
                totals.grand_total,
                input.down_payment,
                totals.remaining_balance,
                totals.status,
                input.notes.as_deref(),
                created_by,
            )
            .await?;

        // 6. Itens (receita normalizada só para lentes) + ordem de serviço
        let mut items = Vec::with_capacity(input.items.len());
        for (line, product) in input.items.iter().zip(&resolved) {
            let rx = line
                .prescription
                .as_ref()
                .filter(|_| product.is_lens())
                .map(Prescription::normalized)
                .unwrap_or_default();

            let item = self
                .invoice_repo
                .insert_item(
                    &mut *tx,
                    invoice.id,
                    product.id,
                    &product.name,
                    line.quantity,
                    line.price,
                    line.discount,
                    rx.sph,
                    rx.cyl,
                    rx.axis,
                    rx.add_power,
                    rx.mpd,
                )
                .await?;

            if product.is_lens() {
                self.job_order_repo
                    .append_status(
                        &mut *tx,
                        item.id,
                        JobOrderStatus::Pending,
                        author,
                        Some("Criado na venda"),
                    )
                    .await?;
            }

            items.push(item);
        }

        // 7. Baixa de estoque dos produtos rastreados. A guarda no UPDATE
        // é o cinto E suspensório: já validamos em (2) segurando o lock.
        for (line, product) in input.items.iter().zip(&resolved) {
            if product.track_inventory {
                self.product_repo
                    .adjust_stock(&mut *tx, product.id, -line.quantity)
                    .await?
                    .ok_or_else(|| AppError::InsufficientStock {
                        product: product.name.clone(),
                        available: product.stock_qty,
                        requested: line.quantity,
                    })?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "Fatura {} emitida ({} itens, total {})",
            invoice.invoice_number,
            items.len(),
            invoice.grand_total
        );

        Ok(InvoiceDetail {
            header: invoice,
            items,
            payments: vec![],
        })
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<InvoiceDetail, AppError> {
        let header = self
            .invoice_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", id)))?;

        let items = self.invoice_repo.list_items(&self.pool, id).await?;
        let payments = self.invoice_repo.list_payments(&self.pool, id).await?;

        Ok(InvoiceDetail {
            header,
            items,
            payments,
        })
    }

    // Registra um pagamento e atualiza o saldo na mesma transação.
    pub async fn record_payment(
        &self,
        invoice_id: Uuid,
        payment_type_id: Option<Uuid>,
        amount: Decimal,
        notes: Option<&str>,
        created_by: Option<Uuid>,
    ) -> Result<(Payment, InvoiceDetail), AppError> {
        let mut tx = self.pool.begin().await?;

        let payment = self
            .invoice_repo
            .insert_payment(&mut *tx, invoice_id, payment_type_id, amount, notes, created_by)
            .await?;

        self.invoice_repo
            .apply_payment(&mut *tx, invoice_id, amount)
            .await?;

        tx.commit().await?;

        let detail = self.get_detail(invoice_id).await?;
        Ok((payment, detail))
    }

    // Cancela a fatura e devolve o estoque dos produtos rastreados.
    pub async fn cancel_invoice(&self, id: Uuid) -> Result<InvoiceDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let invoice = self
            .invoice_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", id)))?;

        if invoice.status == InvoiceStatus::Cancelled {
            return Err(AppError::UniqueConstraintViolation(format!(
                "A fatura {} já está cancelada.",
                invoice.invoice_number
            )));
        }

        self.invoice_repo
            .set_status(&mut *tx, id, InvoiceStatus::Cancelled)
            .await?;

        let items = self.invoice_repo.list_items(&mut *tx, id).await?;
        for item in &items {
            let product = self
                .product_repo
                .find_for_update(&mut *tx, item.product_id)
                .await?;
            if let Some(product) = product {
                if product.track_inventory {
                    self.product_repo
                        .adjust_stock(&mut *tx, product.id, item.quantity)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        self.get_detail(id).await
    }

    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), AppError> {
        self.invoice_repo.delete(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(quantity: i32, price: &str, discount: &str) -> NewInvoiceItem {
        NewInvoiceItem {
            product_id: Uuid::new_v4(),
            quantity,
            price: dec(price),
            discount: dec(discount),
            prescription: None,
        }
    }

    fn product(name: &str, stock_qty: i32, track_inventory: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            brand: None,
            category: "Frame".to_string(),
            store_price: dec("100000.00"),
            online_price: None,
            buy_price: None,
            sell_price: None,
            stock_qty,
            track_inventory,
            low_stock_alert: 0,
            metadata: serde_json::Value::Object(Default::default()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line_for(product: &Product, quantity: i32) -> NewInvoiceItem {
        NewInvoiceItem {
            product_id: product.id,
            quantity,
            price: dec("100000.00"),
            discount: Decimal::ZERO,
            prescription: None,
        }
    }

    #[test]
    fn next_sequence_starts_at_one() {
        assert_eq!(next_sequence(None), 1);
    }

    #[test]
    fn next_sequence_increments() {
        assert_eq!(next_sequence(Some("GS2405012")), 13);
        assert_eq!(next_sequence(Some("KD2512001")), 2);
    }

    #[test]
    fn next_sequence_wraps_at_999() {
        assert_eq!(next_sequence(Some("GS2405999")), 1);
    }

    #[test]
    fn next_sequence_falls_back_on_garbage() {
        assert_eq!(next_sequence(Some("GS2405xyz")), 1);
        assert_eq!(next_sequence(Some("ab")), 1);
        assert_eq!(next_sequence(Some("")), 1);
    }

    #[test]
    fn compose_number_pads_sequence() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(
            compose_invoice_number(Branch::KelapaDua, date, 1),
            "KD2405001"
        );
        assert_eq!(
            compose_invoice_number(Branch::GadingSerpong, date, 42),
            "GS2405042"
        );
    }

    #[test]
    fn first_number_of_month_for_kelapa_dua() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        let seq = next_sequence(None);
        assert_eq!(
            compose_invoice_number(Branch::KelapaDua, date, seq),
            "KD2601001"
        );
    }

    #[test]
    fn totals_follow_invariants() {
        let items = vec![item(2, "150000.00", "0.00"), item(1, "80000.00", "5000.00")];
        let totals = compute_totals(&items, dec("10000.00"), dec("100000.00"));

        assert_eq!(totals.total_amount, dec("375000.00"));
        assert_eq!(totals.grand_total, dec("365000.00"));
        assert_eq!(totals.remaining_balance, dec("265000.00"));
        assert_eq!(totals.status, InvoiceStatus::Partial);
    }

    #[test]
    fn totals_status_paid_when_nothing_remains() {
        let items = vec![item(1, "50000.00", "0.00")];
        let totals = compute_totals(&items, Decimal::ZERO, dec("50000.00"));
        assert_eq!(totals.remaining_balance, Decimal::ZERO);
        assert_eq!(totals.status, InvoiceStatus::Paid);
    }

    #[test]
    fn totals_status_pending_without_down_payment() {
        let items = vec![item(1, "50000.00", "0.00")];
        let totals = compute_totals(&items, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(totals.status, InvoiceStatus::Pending);
    }

    #[test]
    fn stock_check_rejects_over_request() {
        let armacao = product("Armação X", 2, true);
        let items = vec![line_for(&armacao, 3)];

        let err = check_stock(&items, &[armacao]).unwrap_err();
        match err {
            AppError::InsufficientStock {
                product,
                available,
                requested,
            } => {
                assert_eq!(product, "Armação X");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn stock_check_allows_exact_balance() {
        let armacao = product("Armação X", 3, true);
        let items = vec![line_for(&armacao, 3)];
        assert!(check_stock(&items, &[armacao]).is_ok());
    }

    #[test]
    fn stock_check_ignores_untracked_products() {
        let servico = product("Serviço de montagem", 0, false);
        let items = vec![line_for(&servico, 10)];
        assert!(check_stock(&items, &[servico]).is_ok());
    }

    #[test]
    fn stock_check_accumulates_repeated_lines() {
        // Duas linhas do mesmo produto disputam o mesmo saldo: 3 + 3
        // contra 5 em estoque tem que falhar, mesmo que cada linha
        // isolada coubesse.
        let lente = product("Lente Y", 5, true);
        let items = vec![line_for(&lente, 3), line_for(&lente, 3)];

        let err = check_stock(&items, &[lente.clone(), lente]).unwrap_err();
        match err {
            AppError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn prescription_forces_cyl_negative() {
        let rx = Prescription {
            cyl: Some(dec("1.50")),
            ..Default::default()
        };
        assert_eq!(rx.normalized().cyl, Some(dec("-1.50")));

        // Já negativo: permanece negativo.
        let rx = Prescription {
            cyl: Some(dec("-0.75")),
            ..Default::default()
        };
        assert_eq!(rx.normalized().cyl, Some(dec("-0.75")));
    }

    #[test]
    fn prescription_forces_add_positive() {
        let rx = Prescription {
            add_power: Some(dec("-0.75")),
            ..Default::default()
        };
        assert_eq!(rx.normalized().add_power, Some(dec("0.75")));
    }

    #[test]
    fn prescription_keeps_sph_sign() {
        let rx = Prescription {
            sph: Some(dec("-2.25")),
            ..Default::default()
        };
        assert_eq!(rx.normalized().sph, Some(dec("-2.25")));

        let rx = Prescription {
            sph: Some(dec("2.25")),
            ..Default::default()
        };
        assert_eq!(rx.normalized().sph, Some(dec("2.25")));
    }
}
