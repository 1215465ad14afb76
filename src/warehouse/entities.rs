//! Warehouse table entities.

pub mod customers {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "customers")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub customer_id: String,
        pub name: Option<String>,
        pub region: Option<String>,
        pub join_date: Option<String>,
        pub age: Option<i32>,
        pub subscription_status: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::sales::Entity")]
        Sales,
    }

    impl Related<super::sales::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Sales.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod products {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub product_id: String,
        pub product_name: Option<String>,
        pub category: Option<String>,
        pub unit_price: Option<f64>,
        pub manufacture_year: Option<i32>,
        pub availability_status: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::sales::Entity")]
        Sales,
    }

    impl Related<super::sales::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Sales.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod sales {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "sales")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub sale_id: i64,
        pub sale_date: Option<String>,
        pub customer_id: Option<String>,
        pub product_id: Option<String>,
        pub store_id: Option<String>,
        pub campaign_id: Option<String>,
        pub quantity: Option<i32>,
        pub sales_amount: Option<f64>,
        pub discount_amount: Option<f64>,
        pub state: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customers::Entity",
            from = "Column::CustomerId",
            to = "super::customers::Column::CustomerId"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::products::Entity",
            from = "Column::ProductId",
            to = "super::products::Column::ProductId"
        )]
        Product,
    }

    impl Related<super::customers::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<super::products::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Product.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
